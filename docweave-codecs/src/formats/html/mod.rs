//! HTML format implementation
//!
//! Strategy: Node tree ⇄ html5ever RcDom
//!
//! # Data Model
//!
//! | Node | HTML Element | Notes |
//! |------|--------------|-------|
//! | Article | `<article itemscope>` | Title as `<h1 itemprop="headline">` |
//! | Paragraph | `<p>` | |
//! | Heading | `<h1>`-`<h6>` | Depth clamped to 6 |
//! | List | `<ul>` / `<ol>` | `reversed` for descending order, checkbox inputs for task items |
//! | Table | `<table>` | Header rows in `<thead>`, spans as `colspan`/`rowspan` |
//! | CodeBlock | `<pre><code class="language-X">` | |
//! | CodeChunk | `<figure class="code-chunk">` | Source in `<pre class="source">`, outputs in `<div class="outputs">` |
//! | Figure | `<figure>` + `<figcaption>` | Label in `data-label` |
//! | MathBlock / MathFragment | `<div class="math-block">` / `<span class="math-fragment">` | Language in `data-math-language` |
//! | Primitives | `<data itemtype="https://schema.org/X" value="json">` | |
//! | Cite | `<cite><a href="#target">` | |
//!
//! # Decoding
//!
//! Decoding walks the parsed DOM and maps the same elements back. Whitespace outside `<pre>` is
//! collapsed; `<script>`, `<style>` and `<head>` are skipped; unrecognized elements are logged
//! and replaced by their children.
//!
//! Markdown reuses [`decode_fragment`] for raw HTML embedded in its source.

mod decode;
mod encode;

pub use decode::decode_fragment;

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::require_text;
use crate::vfile::VFile;
use docweave_schema::Node;

const MICRODATA_BASE: &str = "https://schema.org/";

fn itemtype(type_name: &str) -> String {
    format!("{MICRODATA_BASE}{type_name}")
}

pub struct HtmlCodec;

impl Codec for HtmlCodec {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML5 with schema.org microdata"
    }

    fn media_types(&self) -> &[&str] {
        &["text/html"]
    }

    fn ext_names(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    fn sniff(&self, content: &str) -> bool {
        let head = content.trim_start().to_ascii_lowercase();
        head.starts_with("<!doctype html") || head.starts_with("<html")
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let html = require_text(file, self.name())?;
        Ok(Node::Article(decode::decode_document(html)))
    }

    fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<VFile, CodecError> {
        let html = encode::encode_html(node, options.standalone)?;
        Ok(VFile::text(html).with_media_type("text/html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_schema::{Article, Block, Heading, Inline, Mark, Paragraph};
    use pretty_assertions::assert_eq;

    fn round_trip(article: Article) -> Article {
        let options = EncodeOptions {
            standalone: true,
            ..EncodeOptions::to_format("html")
        };
        let file = HtmlCodec.encode(&Node::Article(article), &options).unwrap();
        match HtmlCodec.decode(&file, &DecodeOptions::default()).unwrap() {
            Node::Article(article) => article,
            other => panic!("expected article, got {other:?}"),
        }
    }

    #[test]
    fn sniffs_doctype_case_insensitively() {
        assert!(HtmlCodec.sniff("<!DOCTYPE html>\n<html></html>"));
        assert!(HtmlCodec.sniff("  <html lang=\"en\">"));
        assert!(!HtmlCodec.sniff("<article><front>"));
    }

    #[test]
    fn title_and_body_round_trip() {
        let article = Article::new(vec![
            Block::Heading(Heading::new(2, vec![Inline::from("Intro")])),
            Block::paragraph(vec![
                Inline::from("Some "),
                Inline::Strong(Mark::new(vec![Inline::from("bold")])),
                Inline::from(" text."),
            ]),
        ])
        .with_title(vec![Inline::from("Title")]);
        assert_eq!(round_trip(article.clone()), article);
    }

    #[test]
    fn primitives_round_trip() {
        let article = Article::new(vec![Block::Paragraph(Paragraph::new(vec![
            Inline::Integer(42),
            Inline::from(" and "),
            Inline::Boolean(false),
            Inline::from(" and "),
            Inline::Null,
        ]))]);
        assert_eq!(round_trip(article.clone()), article);
    }
}
