//! Markdown codec integration tests
//!
//! Rust does not discover tests in subdirectories, so each file is a module here.

mod decode;
mod encode;
mod roundtrip;

use docweave_codecs::{Codec, DecodeOptions, EncodeOptions, VFile};
use docweave_codecs::formats::MarkdownCodec;
use docweave_schema::{Article, Node};

pub fn md_to_article(markdown: &str) -> Article {
    match MarkdownCodec
        .decode(&VFile::text(markdown), &DecodeOptions::default())
        .expect("markdown should decode")
    {
        Node::Article(article) => article,
        other => panic!("expected an article, got {other:?}"),
    }
}

pub fn article_to_md(article: Article) -> String {
    MarkdownCodec
        .encode(&Node::Article(article), &EncodeOptions::to_format("md"))
        .expect("markdown should encode")
        .into_text()
        .expect("markdown is text")
}
