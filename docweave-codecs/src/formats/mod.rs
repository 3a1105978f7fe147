//! Codec implementations
//!
//! One module per format. Document formats (`markdown`, `html`, `jats`) split their decoder and
//! encoder into separate files; small formats fit in one.

pub mod html;
pub mod http;
pub mod ipynb;
pub mod jats;
pub mod json;
pub mod markdown;
pub mod pdf;
pub mod txt;
pub mod yaml;

pub use html::HtmlCodec;
pub use http::HttpCodec;
pub use ipynb::IpynbCodec;
pub use jats::JatsCodec;
pub use json::JsonCodec;
pub use markdown::MarkdownCodec;
pub use pdf::PdfCodec;
pub use txt::TxtCodec;
pub use yaml::YamlCodec;

use crate::error::CodecError;
use crate::vfile::VFile;
use docweave_schema::{coerce_blocks, Article, Node};
use std::borrow::Cow;

/// The text of a file, or `MalformedInput` for binary content
pub(crate) fn require_text<'a>(file: &'a VFile, format: &str) -> Result<&'a str, CodecError> {
    file.as_text()
        .ok_or_else(|| CodecError::malformed(format, "expected text content, got binary"))
}

/// View any node as an article, wrapping non-article content as its body
pub(crate) fn as_article(node: &Node) -> Cow<'_, Article> {
    match node {
        Node::Article(article) => Cow::Borrowed(article),
        Node::Array(nodes) => Cow::Owned(Article::new(coerce_blocks(nodes.clone()))),
        other => Cow::Owned(Article::new(coerce_blocks(vec![other.clone()]))),
    }
}
