//! Markdown → tree → Markdown → tree

use super::{article_to_md, md_to_article};
use docweave_schema::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn round_trip(article: Article) -> Article {
    md_to_article(&article_to_md(article))
}

#[test]
fn test_boolean_survives() {
    let article = Article::new(vec![Block::paragraph(vec![
        Inline::from("flag "),
        Inline::Boolean(true),
    ])]);

    assert_eq!(round_trip(article.clone()), article);
}

#[test]
fn test_title_survives() {
    let article = Article::new(vec![Block::paragraph(vec![Inline::from("Body")])])
        .with_title(vec![Inline::from("Title")]);

    assert_eq!(round_trip(article.clone()), article);
}

#[test]
fn test_kitchensink_is_stable() {
    let source = include_str!("fixtures/kitchensink.md");
    let first = md_to_article(source);
    let second = round_trip(first.clone());

    assert_eq!(second, first);
}

#[test]
fn test_expression_with_markdown_punctuation_survives() {
    let article = Article::new(vec![Block::paragraph(vec![
        Inline::from("Value "),
        Inline::CodeExpression(CodeExpression {
            text: "a*b*c + x_1".into(),
            programming_language: Some("py".into()),
            output: None,
        }),
    ])]);

    assert_eq!(round_trip(article.clone()), article);
}

#[test]
fn test_array_with_markdown_punctuation_survives() {
    let article = Article::new(vec![Block::paragraph(vec![Inline::Array(vec![
        Node::from("*bold*"),
        Node::from("[x](y)"),
        Node::Integer(2),
    ])])]);

    assert_eq!(round_trip(article.clone()), article);
}

#[test]
fn test_text_that_looks_like_an_extension_stays_text() {
    let article = Article::new(vec![Block::paragraph(vec![Inline::from(
        "Say !true or !null now",
    )])]);

    assert_eq!(round_trip(article.clone()), article);
}

#[test]
fn test_heading_ending_in_braces_survives() {
    let article = Article::new(vec![
        Block::Heading(Heading::new(2, vec![Inline::from("The set {x}")])),
        Block::paragraph(vec![Inline::from("Body")]),
    ]);

    assert_eq!(round_trip(article.clone()), article);
}

proptest! {
    #[test]
    fn plain_paragraphs_round_trip(words in prop::collection::vec("[a-z]{1,12}", 1..20)) {
        let text = words.join(" ");
        let article = Article::new(vec![Block::paragraph(vec![Inline::from(text)])]);

        prop_assert_eq!(round_trip(article.clone()), article);
    }

    #[test]
    fn punctuated_paragraphs_round_trip(
        words in prop::collection::vec("[a-z!*_{}\\[\\]]{1,12}", 1..20)
    ) {
        let text = words.join(" ");
        let article = Article::new(vec![Block::paragraph(vec![Inline::from(text)])]);

        prop_assert_eq!(round_trip(article.clone()), article);
    }
}
