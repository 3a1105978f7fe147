//! Markdown → tree

use super::md_to_article;
use docweave_schema::*;
use pretty_assertions::assert_eq;

#[test]
fn test_title_and_emphasis() {
    let article = md_to_article("# Title\n\nSome *text*.\n");

    assert_eq!(article.title, Some(vec![Inline::from("Title")]));
    assert_eq!(
        article.content,
        vec![Block::paragraph(vec![
            Inline::from("Some "),
            Inline::Emphasis(Mark::new(vec![Inline::from("text")])),
            Inline::from("."),
        ])]
    );
}

#[test]
fn test_later_headings_stay_in_content() {
    let article = md_to_article("# Title\n\n## Methods\n\nWe did things.\n");

    assert_eq!(
        article.content[0],
        Block::Heading(Heading::new(2, vec![Inline::from("Methods")]))
    );
}

#[test]
fn test_front_matter_fields() {
    let article = md_to_article(
        "---\ntitle: From front matter\nauthors:\n  - type: Person\n    givenNames: [Ann]\n    familyNames: [Smith]\ndatePublished: '2020-01-02'\n---\n\nBody\n",
    );

    assert_eq!(article.title, Some(vec![Inline::from("From front matter")]));
    assert_eq!(article.date_published.as_deref(), Some("2020-01-02"));
    assert_eq!(article.authors.len(), 1);
    assert_eq!(article.content, vec![Block::paragraph(vec![Inline::from("Body")])]);
}

#[test]
fn test_nested_lists() {
    let article = md_to_article("1. one\n2. two\n   - inner\n");

    let Block::List(list) = &article.content[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.order, ListOrder::Ascending);
    assert_eq!(list.items.len(), 2);
    let Block::List(inner) = &list.items[1].content[1] else {
        panic!("expected a nested list");
    };
    assert_eq!(inner.order, ListOrder::Unordered);
}

#[test]
fn test_fenced_code_and_quote() {
    let article = md_to_article("```rust\nfn main() {}\n```\n\n> quoted\n");

    assert_eq!(
        article.content,
        vec![
            Block::CodeBlock(CodeBlock {
                text: "fn main() {}".into(),
                programming_language: Some("rust".into()),
                ..Default::default()
            }),
            Block::QuoteBlock(QuoteBlock {
                cite: None,
                content: vec![Block::paragraph(vec![Inline::from("quoted")])],
            }),
        ]
    );
}

#[test]
fn test_link_and_image() {
    let article = md_to_article("See [docs](https://example.org \"Docs\") and ![alt](a.png).\n");

    let Block::Paragraph(paragraph) = &article.content[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(
        paragraph.content[1],
        Inline::Link(Link {
            title: Some("Docs".into()),
            ..Link::new("https://example.org", vec![Inline::from("docs")])
        })
    );
    let Inline::ImageObject(image) = &paragraph.content[3] else {
        panic!("expected an image, got {:?}", paragraph.content[3]);
    };
    assert_eq!(image.content_url, "a.png");
}

#[test]
fn test_extension_primitives() {
    let article = md_to_article("Answer: !number[42]\n");

    assert_eq!(
        article.content,
        vec![Block::paragraph(vec![
            Inline::from("Answer: "),
            Inline::Integer(42),
        ])]
    );
}

#[test]
fn test_heading_annotation_needs_a_value() {
    let article = md_to_article("## The set {x}\n\n## Intro {id=intro}\n");

    assert_eq!(
        article.content,
        vec![
            Block::Heading(Heading::new(2, vec![Inline::from("The set {x}")])),
            Block::Heading(Heading {
                id: Some("intro".into()),
                ..Heading::new(2, vec![Inline::from("Intro")])
            }),
        ]
    );
}

#[test]
fn test_escaped_bang_is_text() {
    let article = md_to_article("Say \\!true, not !true\n");

    assert_eq!(
        article.content,
        vec![Block::paragraph(vec![
            Inline::from("Say !true, not "),
            Inline::Boolean(true),
        ])]
    );
}
