//! Plain text codec
//!
//! The catch-all: it never sniffs, so it is only chosen by name, extension or media type.
//! Encoding keeps the text and loses all structure.

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::require_text;
use crate::vfile::VFile;
use docweave_schema::{Article, Block, Inline, Node, Paragraph, ToText};

pub struct TxtCodec;

impl Codec for TxtCodec {
    fn name(&self) -> &str {
        "txt"
    }

    fn description(&self) -> &str {
        "Plain text"
    }

    fn media_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn ext_names(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let text = require_text(file, self.name())?;
        let content = paragraphs(text)
            .map(|para| Block::Paragraph(Paragraph::new(vec![Inline::from(para)])))
            .collect();
        Ok(Node::Article(Article::new(content)))
    }

    fn encode(&self, node: &Node, _options: &EncodeOptions) -> Result<VFile, CodecError> {
        Ok(VFile::text(node.to_text()).with_media_type("text/plain"))
    }
}

/// Blank-line separated runs, with their lines joined by single spaces
fn paragraphs(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split("\n\n").filter_map(|chunk| {
        let joined = chunk
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_separate_paragraphs() {
        let node = TxtCodec
            .decode(
                &VFile::text("one\ntwo\n\n\nthree\n"),
                &DecodeOptions::default(),
            )
            .unwrap();
        let Node::Article(article) = node else {
            panic!("expected article");
        };
        assert_eq!(article.content.len(), 2);
        assert_eq!(article.content[0].to_text(), "one two");
        assert_eq!(article.content[1].to_text(), "three");
    }

    #[test]
    fn never_sniffs() {
        assert!(!TxtCodec.sniffs());
    }
}
