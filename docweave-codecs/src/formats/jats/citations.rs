//! Author-year citation text for references

use docweave_schema::CreativeWork;

/// `Smith, 1990`, `Smith and Jones, 1990` or `Smith et al., 1990`
///
/// Falls back to the title, then the id, when a work has no named authors.
pub fn citation_text(work: &CreativeWork) -> String {
    let names: Vec<String> = work
        .authors
        .iter()
        .filter_map(|author| author.citation_name())
        .collect();

    let who = match names.as_slice() {
        [] => None,
        [one] => Some(one.clone()),
        [first, second] => Some(format!("{first} and {second}")),
        [first, ..] => Some(format!("{first} et al.")),
    };

    match (who, work.year()) {
        (Some(who), Some(year)) => format!("{who}, {year}"),
        (Some(who), None) => who,
        (None, year) => {
            let label = work
                .title
                .clone()
                .or_else(|| work.id.clone())
                .unwrap_or_default();
            match year {
                Some(year) if !label.is_empty() => format!("{label}, {year}"),
                Some(year) => year.to_string(),
                None => label,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_schema::{Author, Organization, Person};
    use rstest::rstest;

    fn work(names: &[&str], date: Option<&str>) -> CreativeWork {
        CreativeWork {
            authors: names
                .iter()
                .map(|name| Author::Person(Person::from_name(name)))
                .collect(),
            date_published: date.map(str::to_string),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(&["Ann Smith"], "Smith, 1990")]
    #[case(&["Ann Smith", "Bo Jones"], "Smith and Jones, 1990")]
    #[case(&["Ann Smith", "Bo Jones", "Cy Lee"], "Smith et al., 1990")]
    fn author_year(#[case] names: &[&str], #[case] expected: &str) {
        assert_eq!(citation_text(&work(names, Some("1990-02-01"))), expected);
    }

    #[test]
    fn organizations_cite_by_name() {
        let report = CreativeWork {
            authors: vec![Author::Organization(Organization {
                name: Some("WHO".into()),
                ..Default::default()
            })],
            date_published: Some("2020".into()),
            ..Default::default()
        };
        assert_eq!(citation_text(&report), "WHO, 2020");
    }

    #[test]
    fn falls_back_to_title() {
        let tract = CreativeWork {
            title: Some("Anonymous tract".into()),
            ..Default::default()
        };
        assert_eq!(citation_text(&tract), "Anonymous tract");
        assert_eq!(citation_text(&work(&["Ann Smith"], None)), "Smith");
    }
}
