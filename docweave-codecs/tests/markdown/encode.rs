//! Tree → Markdown

use super::article_to_md;
use docweave_schema::*;
use pretty_assertions::assert_eq;

#[test]
fn test_boolean_uses_extension() {
    let article = Article::new(vec![Block::paragraph(vec![
        Inline::from("It is "),
        Inline::Boolean(true),
    ])]);

    let markdown = article_to_md(article);
    assert!(markdown.contains("!true"), "got {markdown:?}");
}

#[test]
fn test_whitespace_paragraph_dropped() {
    let article = Article::new(vec![
        Block::paragraph(vec![Inline::from("First")]),
        Block::paragraph(vec![Inline::from(" \t ")]),
        Block::paragraph(vec![Inline::from("Second")]),
    ]);

    assert_eq!(article_to_md(article), "First\n\nSecond\n");
}

#[test]
fn test_title_goes_to_front_matter() {
    let article = Article::new(vec![Block::paragraph(vec![Inline::from("Body")])])
        .with_title(vec![Inline::from("My paper")]);

    let markdown = article_to_md(article);
    assert!(markdown.starts_with("---\ntitle: My paper\n---\n\n"), "got {markdown:?}");
    assert!(markdown.ends_with("Body\n"));
}

#[test]
fn test_emphasis_and_strong() {
    let article = Article::new(vec![Block::paragraph(vec![
        Inline::Emphasis(Mark::new(vec![Inline::from("soft")])),
        Inline::from(" and "),
        Inline::Strong(Mark::new(vec![Inline::from("loud")])),
    ])]);

    assert_eq!(article_to_md(article), "*soft* and **loud**\n");
}

#[test]
fn test_code_chunk_fence() {
    let chunk = CodeChunk {
        text: "1 + 1".into(),
        programming_language: Some("python".into()),
        outputs: vec![Node::Integer(2)],
        ..Default::default()
    };

    let markdown = article_to_md(Article::new(vec![Block::CodeChunk(chunk)]));
    assert!(markdown.starts_with("chunk:"), "got {markdown:?}");
    assert!(markdown.contains("```python\n1 + 1\n```"));
    assert!(markdown.contains("!number[2]"));
}
