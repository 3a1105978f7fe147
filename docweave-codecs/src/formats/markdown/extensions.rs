//! Extension syntax for nodes CommonMark has no notation for
//!
//! Inline form: `!name[content](argument){props}`, every part after the name optional.
//!
//! ```text
//! !null  !true  !false  !boolean[true]  !number[3.14]
//! !array[1,2]            content is the JSON array body
//! !object["a":1]         content is the JSON object body
//! !quote[text](cite)     comrak sees "!quote" followed by a link
//! !expr[x \* 2]{lang=python}
//! ```
//!
//! Markdown punctuation inside `[content]` is backslash-escaped so comrak hands it back as text.
//! An escaped `\!` is never the start of an extension: the decoder reads it as [`ESCAPED_BANG`]
//! and turns it back into `!` once the text has been scanned.
//!
//! Block form, a fence around ordinary markdown blocks:
//!
//! ```text
//! figure: Figure 1
//! :::
//! ![](plot.png)
//!
//! ---
//!
//! The caption.
//! :::{id=fig1}
//! ```
//!
//! An [`Extension`] only lives between scanning and node construction on decode, and between node
//! inspection and stringification on encode.

use super::attrs;
use docweave_schema::Meta;
use once_cell::sync::Lazy;
use regex::Regex;

/// Stands in for an escaped `\!` until text has been scanned
pub const ESCAPED_BANG: char = '\u{E000}';

/// Characters that would start markdown syntax inside extension content
const CONTENT_ESCAPES: &[char] = &['\\', '`', '*', '_', '[', ']', '<', '>', '&', '$', '~', '^', '|'];

static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!([a-zA-Z][a-zA-Z0-9_]*)").expect("valid extension regex"));

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9_]*):[ \t]*([^\n]*)\n:::$").expect("valid fence regex")
});

static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:::(\{.*\})?$").expect("valid fence regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Null,
    True,
    False,
    Boolean,
    Number,
    Array,
    Object,
    Quote,
    Expr,
    Chunk,
    Figure,
    Include,
}

impl ExtensionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "true" => Self::True,
            "false" => Self::False,
            "boolean" => Self::Boolean,
            "number" => Self::Number,
            "array" => Self::Array,
            "object" => Self::Object,
            "quote" => Self::Quote,
            "expr" => Self::Expr,
            "chunk" => Self::Chunk,
            "figure" => Self::Figure,
            "include" => Self::Include,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Quote => "quote",
            Self::Expr => "expr",
            Self::Chunk => "chunk",
            Self::Figure => "figure",
            Self::Include => "include",
        }
    }

    pub fn is_block(self) -> bool {
        matches!(self, Self::Chunk | Self::Figure | Self::Include)
    }

    /// Whether the inline form is meaningless without `[content]`
    pub fn needs_content(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Number | Self::Array | Self::Object | Self::Quote | Self::Expr
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub kind: ExtensionKind,
    pub content: Option<String>,
    pub argument: Option<String>,
    pub properties: Meta,
}

impl Extension {
    pub fn new(kind: ExtensionKind) -> Self {
        Self {
            kind,
            content: None,
            argument: None,
            properties: Meta::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    pub fn with_properties(mut self, properties: Meta) -> Self {
        self.properties = properties;
        self
    }

    /// The inline form
    pub fn to_inline(&self) -> String {
        let mut out = format!("!{}", self.kind.name());
        if let Some(content) = &self.content {
            out.push('[');
            out.push_str(&escape_content(content));
            out.push(']');
        }
        if let Some(argument) = &self.argument {
            out.push('(');
            out.push_str(argument);
            out.push(')');
        }
        out.push_str(&attrs::format(&self.properties));
        out
    }

    /// The opening fence line pair of the block form
    pub fn fence_open(&self) -> String {
        match self.argument.as_deref().filter(|arg| !arg.is_empty()) {
            Some(argument) => format!("{}: {argument}\n:::", self.kind.name()),
            None => format!("{}:\n:::", self.kind.name()),
        }
    }

    /// The closing fence line of the block form
    pub fn fence_close(&self) -> String {
        format!(":::{}", attrs::format(&self.properties))
    }
}

fn escape_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        if CONTENT_ESCAPES.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Scanned text back to what the author wrote
pub fn unprotect(text: &str) -> String {
    text.replace(ESCAPED_BANG, "!")
}

/// An inline extension found in a run of text
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned<'a> {
    /// Byte range of the whole extension within the text
    pub start: usize,
    pub end: usize,
    pub name: &'a str,
    pub kind: Option<ExtensionKind>,
    pub content: Option<&'a str>,
    pub argument: Option<&'a str>,
    pub properties: Option<Meta>,
}

/// Find the next `!name...` in `text` at or after `from`
pub fn scan(text: &str, from: usize) -> Option<Scanned<'_>> {
    let caps = NAME.captures_at(text, from)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?.as_str();
    let mut end = whole.end();

    let content = bracketed(&text[end..], '[', ']').map(|inner| {
        end += inner.len() + 2;
        inner
    });
    let argument = match content {
        Some(_) => bracketed(&text[end..], '(', ')').map(|inner| {
            end += inner.len() + 2;
            inner
        }),
        None => None,
    };
    let properties = attrs::leading(&text[end..]).map(|(properties, len)| {
        end += len;
        properties
    });

    Some(Scanned {
        start: whole.start(),
        end,
        name,
        kind: ExtensionKind::from_name(name),
        content,
        argument,
        properties,
    })
}

/// The text between a balanced `open`/`close` pair at the start of `text`
pub fn bracketed(text: &str, open: char, close: char) -> Option<&str> {
    if !text.starts_with(open) {
        return None;
    }
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[open.len_utf8()..index]);
            }
        }
    }
    None
}

/// `name: argument\n:::` opening a block extension
pub fn parse_fence_open(text: &str) -> Option<(String, String)> {
    let caps = FENCE_OPEN.captures(text)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

/// `:::` or `:::{props}` closing a block extension
pub fn parse_fence_close(text: &str) -> Option<Meta> {
    let caps = FENCE_CLOSE.captures(text.trim())?;
    Some(
        caps.get(1)
            .and_then(|props| attrs::leading(props.as_str()))
            .map(|(props, _)| props)
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scans_all_parts() {
        let text = "x = !expr[a [b] c]{lang=py} done";
        let found = scan(text, 0).unwrap();
        assert_eq!(found.kind, Some(ExtensionKind::Expr));
        assert_eq!(found.content, Some("a [b] c"));
        assert_eq!(found.argument, None);
        assert_eq!(
            found.properties.unwrap().get("lang").map(String::as_str),
            Some("py")
        );
        assert_eq!(&text[found.end..], " done");
    }

    #[test]
    fn bare_names_have_no_content() {
        let found = scan("it is !true.", 0).unwrap();
        assert_eq!(found.kind, Some(ExtensionKind::True));
        assert_eq!(found.content, None);
        assert_eq!((found.start, found.end), (6, 11));
    }

    #[test]
    fn unknown_names_are_reported() {
        let found = scan("!shout[hey]", 0).unwrap();
        assert_eq!(found.kind, None);
        assert_eq!(found.name, "shout");
    }

    #[test]
    fn inline_form_round_trips_through_scan() {
        let ext = Extension::new(ExtensionKind::Quote)
            .with_content("words")
            .with_argument("https://example.org");
        let text = ext.to_inline();
        assert_eq!(text, "!quote[words](https://example.org)");
        let found = scan(&text, 0).unwrap();
        assert_eq!(found.argument, Some("https://example.org"));
    }

    #[test]
    fn content_punctuation_is_escaped() {
        let ext = Extension::new(ExtensionKind::Expr).with_content("a*b_[c]");
        assert_eq!(ext.to_inline(), r"!expr[a\*b\_\[c\]]");
    }

    #[test]
    fn escaped_bangs_are_not_scanned() {
        let text = format!("say {ESCAPED_BANG}true");
        assert!(scan(&text, 0).is_none());
        assert_eq!(unprotect(&text), "say !true");
    }

    #[test]
    fn fences() {
        let ext = Extension::new(ExtensionKind::Figure).with_argument("Figure 1");
        assert_eq!(
            parse_fence_open(&ext.fence_open()),
            Some(("figure".to_string(), "Figure 1".to_string()))
        );
        assert_eq!(parse_fence_open("chunk:\n:::"), Some(("chunk".into(), "".into())));
        assert_eq!(parse_fence_close(":::"), Some(Meta::new()));
        assert_eq!(
            parse_fence_close(":::{id=a}").unwrap().get("id").map(String::as_str),
            Some("a")
        );
        assert_eq!(parse_fence_close("::: nope"), None);
    }
}
