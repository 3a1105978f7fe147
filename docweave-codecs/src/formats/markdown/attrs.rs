//! Attribute annotations: `{key=value key2="value two"}`
//!
//! They follow inline code, links and images, terminate headings, and trail the language in a
//! fenced code info string. `lang` and `id` are lifted into node fields by the caller; everything
//! else ends up in the node's `meta`.

use docweave_schema::Meta;
use once_cell::sync::Lazy;
use regex::Regex;

static PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_.:-]*)(?:=(?:"([^"]*)"|([^\s"]*)))?"#)
        .expect("valid attribute regex")
});

/// Parse the inside of a `{...}` annotation
///
/// A bare key is recorded with an empty value, but at least one key needs an `=value`. Returns
/// `None` when the text is empty or contains anything other than pairs, so ordinary braces in
/// prose such as `{x}` are left alone.
pub fn parse(inner: &str) -> Option<Meta> {
    let mut attrs = Meta::new();
    let mut valued = false;
    let mut rest = inner.trim();
    while !rest.is_empty() {
        let pair = PAIR.captures(rest).filter(|caps| caps.get(0).map(|m| m.start()) == Some(0))?;
        let key = pair.get(1)?.as_str().to_string();
        let value = pair
            .get(2)
            .or_else(|| pair.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        valued |= pair.get(2).is_some() || pair.get(3).is_some();
        attrs.insert(key, value);
        rest = rest[pair.get(0)?.end()..].trim_start();
    }
    valued.then_some(attrs)
}

/// An annotation at the very start of `text`, with the number of bytes it spans
pub fn leading(text: &str) -> Option<(Meta, usize)> {
    if !text.starts_with('{') {
        return None;
    }
    let end = text.find('}')?;
    let attrs = parse(&text[1..end])?;
    Some((attrs, end + 1))
}

/// An annotation at the end of `text`, with the byte offset where it starts
///
/// The annotation must stand alone or follow whitespace, which then belongs to it.
pub fn trailing(text: &str) -> Option<(Meta, usize)> {
    let trimmed = text.trim_end();
    if !trimmed.ends_with('}') {
        return None;
    }
    let open = trimmed.rfind('{')?;
    if !trimmed[..open].is_empty() && !trimmed[..open].ends_with(char::is_whitespace) {
        return None;
    }
    let attrs = parse(&trimmed[open + 1..trimmed.len() - 1])?;
    let start = trimmed[..open].trim_end().len();
    Some((attrs, start))
}

/// Render attributes as `{k=v k2="v w"}`, or nothing when there are none
pub fn format(attrs: &Meta) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = attrs
        .iter()
        .map(|(key, value)| {
            if value.is_empty() || value.contains(|c: char| c.is_whitespace() || "{}\"".contains(c))
            {
                format!("{key}=\"{}\"", value.replace('"', "'"))
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    format!("{{{}}}", pairs.join(" "))
}

/// Split a fenced code info string into its language and annotation
pub fn split_info(info: &str) -> (Option<String>, Meta) {
    let info = info.trim();
    let (lang, attrs) = match info.find('{') {
        Some(open) => match trailing(info) {
            Some((attrs, _)) => (info[..open].trim(), attrs),
            None => (info, Meta::new()),
        },
        None => (info, Meta::new()),
    };
    let lang = lang.split_whitespace().next().map(str::to_string);
    (lang, attrs)
}

/// Build an annotation from node fields plus metadata
pub fn collect(lang: Option<&str>, id: Option<&str>, meta: &Meta) -> Meta {
    let mut attrs = meta.clone();
    if let Some(lang) = lang {
        attrs.insert("lang".to_string(), lang.to_string());
    }
    if let Some(id) = id {
        attrs.insert("id".to_string(), id.to_string());
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(pairs: &[(&str, &str)]) -> Meta {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_quoted_and_bare_values() {
        assert_eq!(
            parse(r#"lang=py title="two words" flag"#),
            Some(meta(&[("lang", "py"), ("title", "two words"), ("flag", "")]))
        );
    }

    #[test]
    fn prose_in_braces_is_not_an_annotation() {
        assert_eq!(parse("not, attrs!"), None);
        assert_eq!(parse("x"), None);
        assert_eq!(parse("a b"), None);
    }

    #[test]
    fn trailing_needs_separating_space() {
        assert_eq!(trailing("The set {x}"), None);
        assert_eq!(trailing("f{id=a}"), None);
        assert_eq!(trailing("{id=a}").map(|(_, start)| start), Some(0));
    }

    #[test]
    fn leading_reports_its_length() {
        let (attrs, len) = leading("{id=a} rest").unwrap();
        assert_eq!(attrs, meta(&[("id", "a")]));
        assert_eq!(len, 6);
    }

    #[test]
    fn trailing_includes_preceding_space() {
        let (attrs, start) = trailing("Intro {id=intro}").unwrap();
        assert_eq!(attrs, meta(&[("id", "intro")]));
        assert_eq!(start, 5);
    }

    #[test]
    fn info_string_splits_language() {
        let (lang, attrs) = split_info("python {exec=true}");
        assert_eq!(lang.as_deref(), Some("python"));
        assert_eq!(attrs, meta(&[("exec", "true")]));
        assert_eq!(split_info(""), (None, Meta::new()));
    }

    #[test]
    fn format_quotes_when_needed() {
        assert_eq!(
            format(&meta(&[("a", "1"), ("b", "x y")])),
            r#"{a=1 b="x y"}"#
        );
        assert_eq!(format(&Meta::new()), "");
    }
}
