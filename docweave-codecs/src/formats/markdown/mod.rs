//! Markdown format implementation
//!
//! Data Model:
//!
//!     CommonMark plus GFM tables, strikethrough, autolinks, superscript and dollar math. Markdown
//!     is far less expressive than the node tree, so a few mappings are needed.
//!
//!     | Node | Markdown | Notes |
//!     | Article metadata | YAML front matter | title, authors, keywords... anything but content |
//!     | Title | front matter `title` | a leading `# Heading` is promoted on decode |
//!     | Heading id | `## Text {id=x}` | |
//!     | CodeFragment / CodeBlock | `` `x`{lang=py} `` / fenced block | info string `lang {attrs}` |
//!     | Primitives | `!null` `!true` `!number[3]` `!array[1,2]` | see [`extensions`] |
//!     | Quote / CodeExpression | `!quote[text](cite)` / `!expr[x]{lang=py}` | |
//!     | CodeChunk / Figure / Include | `name: arg` + `:::` fences | outputs and captions split by `---` |
//!     | Subscript | `<sub>` | inline HTML is decoded through the HTML codec |
//!     | Cite | `[target](#target)` | |
//!     | MathBlock / MathFragment | `$$tex$$` / `$tex$` | non-TeX math is converted on encode |
//!     | ListItem.is_checked | `- [x] text` | |
//!
//!     Lossy: table captions and labels, code chunk captions, expression outputs and non-leading
//!     table header rows have no markdown form.
//!
//! Library
//!
//!     comrak handles both parsing and serialization; the encoder builds a comrak AST and lets
//!     `format_commonmark` do the layout, emitting raw HTML nodes for everything CommonMark lacks.

mod attrs;
mod decode;
mod encode;
mod extensions;

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::{as_article, require_text};
use crate::vfile::VFile;
use comrak::ComrakOptions;
use docweave_schema::{Block, Node};

pub struct MarkdownCodec;

impl Codec for MarkdownCodec {
    fn name(&self) -> &str {
        "md"
    }

    fn description(&self) -> &str {
        "CommonMark with GFM extensions and YAML front matter"
    }

    fn media_types(&self) -> &[&str] {
        &["text/markdown", "text/x-markdown"]
    }

    fn ext_names(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn file_names(&self) -> &[&str] {
        &["README", "CHANGELOG"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    /// Front matter fences, or a level one ATX heading on the first line
    fn sniff(&self, content: &str) -> bool {
        let mut lines = content.trim_start().lines();
        match lines.next().map(str::trim_end) {
            Some("---") => lines.any(|line| line.trim_end() == "---"),
            Some(first) => first.starts_with("# "),
            None => false,
        }
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let markdown = require_text(file, self.name())?;
        Ok(Node::Article(decode::decode_article(markdown)))
    }

    fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<VFile, CodecError> {
        let markdown = encode::encode_article(&as_article(node), options)?;
        Ok(VFile::text(markdown).with_media_type("text/markdown"))
    }
}

/// Decode markdown to blocks, skipping front matter and title promotion
pub(crate) fn decode_fragment(markdown: &str) -> Vec<Block> {
    decode::decode_blocks(markdown)
}

/// Encode blocks to markdown without front matter
pub(crate) fn encode_fragment(blocks: &[Block], options: &EncodeOptions) -> Result<String, CodecError> {
    encode::encode_blocks(blocks, options)
}

fn comrak_options(width: usize) -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.superscript = true;
    options.extension.math_dollars = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    // Keeps `\!` apart from the `!` that opens an extension
    options.render.escaped_char_spans = true;
    // Raw HTML carries the extension syntax through the formatter
    options.render.unsafe_ = true;
    options.render.width = width;
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_schema::{Article, Inline};
    use pretty_assertions::assert_eq;

    #[test]
    fn sniffs_front_matter_and_title() {
        assert!(MarkdownCodec.sniff("---\ntitle: X\n---\n\nBody"));
        assert!(MarkdownCodec.sniff("# Title\n\nBody"));
        assert!(!MarkdownCodec.sniff("---\nno closing fence"));
        assert!(!MarkdownCodec.sniff("<html>"));
    }

    #[test]
    fn title_round_trips_through_front_matter() {
        let article = Article::new(vec![Block::paragraph(vec![Inline::from("Body")])])
            .with_title(vec![Inline::from("Title")]);
        let file = MarkdownCodec
            .encode(&Node::Article(article.clone()), &EncodeOptions::to_format("md"))
            .unwrap();
        assert_eq!(file.as_text(), Some("---\ntitle: Title\n---\n\nBody\n"));
        let decoded = MarkdownCodec.decode(&file, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, Node::Article(article));
    }
}
