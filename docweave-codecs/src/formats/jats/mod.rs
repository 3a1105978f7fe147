//! JATS XML format implementation
//!
//! Journal Article Tag Suite, the archiving format of most scholarly publishers.
//!
//! # Data Model
//!
//! | Node | JATS | Notes |
//! |------|------|-------|
//! | Article title, authors, date, abstract, keywords | `front/article-meta` | affiliations by `xref`/`aff` |
//! | Heading | `sec/title` | depth from `sec` nesting, id from the `sec` |
//! | Paragraph, List, QuoteBlock | `p`, `list`, `disp-quote` | |
//! | Table | `table-wrap` | unlabelled tables are numbered `Table N` on encode |
//! | Figure | `fig` | several content nodes go in `alternatives` |
//! | CodeBlock / CodeChunk | `code` / `code[executable=yes]` | chunk outputs are not kept |
//! | MathBlock / MathFragment | `disp-formula` / `inline-formula` | `tex-math` or inline MathML |
//! | Cite | `xref[ref-type=bibr]` | text rendered from the reference on encode |
//! | references | `back/ref-list/ref` | `element-citation` or `mixed-citation` |
//!
//! Ids and rids have their periods replaced with `-` in both directions.
//!
//! The encoder builds its own element tree ([`xml`]) since roxmltree only parses.

mod citations;
mod decode;
mod encode;
mod sections;
mod xml;

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::{as_article, require_text};
use crate::vfile::VFile;
use docweave_schema::Node;

pub(crate) const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub(crate) const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

pub(crate) const DOCTYPE: &str = r#"<!DOCTYPE article PUBLIC "-//NLM//DTD JATS (Z39.96) Journal Archiving and Interchange DTD with MathML3 v1.2 20190208//EN" "JATS-archivearticle1-mathml3.dtd">"#;

/// Ids with periods are awkward in URLs and CSS selectors
pub(crate) fn normalize_id(id: &str) -> String {
    id.replace('.', "-")
}

pub struct JatsCodec;

impl Codec for JatsCodec {
    fn name(&self) -> &str {
        "jats"
    }

    fn description(&self) -> &str {
        "JATS XML journal articles"
    }

    fn media_types(&self) -> &[&str] {
        &["application/jats+xml"]
    }

    fn ext_names(&self) -> &[&str] {
        &["jats"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    /// A JATS DOCTYPE, or an `<article>` root with JATS front matter
    fn sniff(&self, content: &str) -> bool {
        let has_doctype = content.contains("<!DOCTYPE article") && content.contains("JATS");
        let has_front = content.contains("<article") && content.contains("<front>");
        has_doctype || has_front
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let xml = require_text(file, self.name())?;
        decode::decode_article(xml).map(Node::Article)
    }

    fn encode(&self, node: &Node, _options: &EncodeOptions) -> Result<VFile, CodecError> {
        let xml = encode::encode_article(&as_article(node));
        Ok(VFile::text(xml).with_media_type("application/jats+xml"))
    }
}
