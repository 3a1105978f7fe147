//! YAML codec

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::require_text;
use crate::vfile::VFile;
use docweave_schema::Node;

pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &str {
        "yaml"
    }

    fn description(&self) -> &str {
        "Node tree as YAML"
    }

    fn media_types(&self) -> &[&str] {
        &["application/yaml", "text/yaml", "application/x-yaml"]
    }

    fn ext_names(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    /// A document marker that is not a markdown front matter block
    fn sniff(&self, content: &str) -> bool {
        let mut lines = content.lines();
        if lines.next().map(str::trim_end) != Some("---") {
            return false;
        }
        !lines.any(|line| line.trim_end() == "---")
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let text = require_text(file, self.name())?;
        serde_yaml::from_str(text).map_err(|err| CodecError::malformed("yaml", err))
    }

    fn encode(&self, node: &Node, _options: &EncodeOptions) -> Result<VFile, CodecError> {
        let yaml = serde_yaml::to_string(node).map_err(|err| CodecError::malformed("yaml", err))?;
        Ok(VFile::text(yaml).with_media_type("application/yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_schema::{Article, Block, Inline, Paragraph};

    #[test]
    fn decodes_typed_yaml() {
        let yaml = "type: Article\ntitle: Hello\ncontent:\n  - type: Paragraph\n    content: [world]\n";
        let node = YamlCodec
            .decode(&VFile::text(yaml), &DecodeOptions::default())
            .unwrap();
        let expected = Article::new(vec![Block::Paragraph(Paragraph::new(vec![Inline::from(
            "world",
        )]))])
        .with_title(vec![Inline::from("Hello")]);
        assert_eq!(node, Node::Article(expected));
    }

    #[test]
    fn sniff_ignores_front_matter() {
        assert!(YamlCodec.sniff("---\na: 1\n"));
        assert!(!YamlCodec.sniff("---\ntitle: x\n---\n\n# Body\n"));
    }
}
