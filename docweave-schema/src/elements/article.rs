//! Article and bibliographic metadata
//!
//! An `Article` is the sole top-level container produced when a standalone document is decoded.
//! Fields not modelled explicitly (arbitrary front matter keys, for instance) are kept in
//! `extra` so they survive a round trip through formats that carry them.

use crate::content::{Block, Inline};
use crate::serde_helpers;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "serde_helpers::optional_inlines"
    )]
    pub title: Option<Vec<Inline>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "serde_helpers::optional_blocks"
    )]
    pub description: Option<Vec<Block>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<CreativeWork>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Block>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Article {
    pub fn new(content: Vec<Block>) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: Vec<Inline>) -> Self {
        self.title = Some(title);
        self
    }
}

/// An author is either a person or an organization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Author {
    Person(Person),
    Organization(Organization),
}

impl<'de> Deserialize<'de> for Author {
    // Front matter commonly lists authors as plain names, so a bare string is accepted too.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Tagged(Tagged),
        }

        #[derive(Deserialize)]
        #[serde(tag = "type")]
        enum Tagged {
            Person(Person),
            Organization(Organization),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Name(name) => Author::Person(Person::from_name(&name)),
            Repr::Tagged(Tagged::Person(person)) => Author::Person(person),
            Repr::Tagged(Tagged::Organization(org)) => Author::Organization(org),
        })
    }
}

impl Author {
    /// The name used when rendering citations: family name for people, name for organizations
    pub fn citation_name(&self) -> Option<String> {
        match self {
            Author::Person(person) => person
                .family_names
                .first()
                .cloned()
                .or_else(|| person.given_names.first().cloned()),
            Author::Organization(org) => org.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<Organization>,
}

impl Person {
    /// Split a display name: the last word is the family name, the rest are given names
    pub fn from_name(name: &str) -> Self {
        let mut words: Vec<String> = name.split_whitespace().map(str::to_string).collect();
        let family_names = words.pop().into_iter().collect();
        Self {
            given_names: words,
            family_names,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> String {
        self.given_names
            .iter()
            .chain(self.family_names.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A cited work in an article's reference list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeWork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    /// Name of the periodical or book the work is part of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_part_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CreativeWork {
    /// Four digit year of publication, if the date has one
    pub fn year(&self) -> Option<&str> {
        let date = self.date_published.as_deref()?;
        let year = date.get(0..4)?;
        year.chars().all(|c| c.is_ascii_digit()).then_some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn authors_accept_plain_names() {
        let article: Article = serde_json::from_value(json!({
            "authors": ["Jane Q Doe", {"type": "Organization", "name": "ACME"}]
        }))
        .unwrap();
        match &article.authors[0] {
            Author::Person(person) => {
                assert_eq!(person.given_names, vec!["Jane", "Q"]);
                assert_eq!(person.family_names, vec!["Doe"]);
            }
            other => panic!("expected person, got {other:?}"),
        }
        assert_eq!(article.authors[1].citation_name().as_deref(), Some("ACME"));
    }

    #[test]
    fn unknown_fields_are_kept() {
        let article: Article =
            serde_json::from_value(json!({"title": "T", "licence": "CC-BY"})).unwrap();
        assert_eq!(article.title, Some(vec![Inline::from("T")]));
        assert_eq!(article.extra.get("licence"), Some(&json!("CC-BY")));
    }

    #[test]
    fn year_requires_digits() {
        let work = CreativeWork {
            date_published: Some("1990-05-01".into()),
            ..Default::default()
        };
        assert_eq!(work.year(), Some("1990"));
        let work = CreativeWork {
            date_published: Some("May".into()),
            ..Default::default()
        };
        assert_eq!(work.year(), None);
    }
}
