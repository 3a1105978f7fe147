//! HTML codec integration tests

use docweave_codecs::formats::{HtmlCodec, MarkdownCodec};
use docweave_codecs::{Codec, DecodeOptions, EncodeOptions, VFile};
use docweave_schema::*;
use pretty_assertions::assert_eq;

fn decode_html(html: &str) -> Article {
    match HtmlCodec
        .decode(&VFile::text(html), &DecodeOptions::default())
        .expect("html should decode")
    {
        Node::Article(article) => article,
        other => panic!("expected an article, got {other:?}"),
    }
}

fn encode_html(article: &Article, standalone: bool) -> String {
    let options = EncodeOptions {
        standalone,
        ..EncodeOptions::to_format("html")
    };
    HtmlCodec
        .encode(&Node::Article(article.clone()), &options)
        .expect("html should encode")
        .into_text()
        .expect("html is text")
}

#[test]
fn test_plain_page() {
    let article = decode_html(
        "<!DOCTYPE html><html><head><title>Page</title><style>p {}</style></head>\
         <body><h2>Intro</h2><p>Some <em>text</em>.</p><ul><li>one</li><li>two</li></ul></body></html>",
    );

    assert_eq!(article.title, Some(vec![Inline::from("Page")]));
    assert_eq!(
        article.content,
        vec![
            Block::Heading(Heading::new(2, vec![Inline::from("Intro")])),
            Block::paragraph(vec![
                Inline::from("Some "),
                Inline::Emphasis(Mark::new(vec![Inline::from("text")])),
                Inline::from("."),
            ]),
            Block::List(List::new(
                ListOrder::Unordered,
                vec![
                    ListItem::new(vec![Block::paragraph(vec![Inline::from("one")])]),
                    ListItem::new(vec![Block::paragraph(vec![Inline::from("two")])]),
                ]
            )),
        ]
    );
}

#[test]
fn test_standalone_wraps_document() {
    let article = Article::new(vec![Block::paragraph(vec![Inline::from("Body")])]);

    let page = encode_html(&article, true);
    assert!(page.to_ascii_lowercase().starts_with("<!doctype html>"), "got {page}");

    let fragment = encode_html(&article, false);
    assert!(!fragment.to_ascii_lowercase().contains("<!doctype"));
    assert!(fragment.contains("Body"));
}

#[test]
fn test_markdown_through_html() {
    let Node::Article(article) = MarkdownCodec
        .decode(
            &VFile::text("# Title\n\nSome *text*.\n\n```rust\nlet x = 1;\n```\n"),
            &DecodeOptions::default(),
        )
        .expect("markdown should decode")
    else {
        panic!("expected an article");
    };

    assert_eq!(decode_html(&encode_html(&article, true)), article);
}
