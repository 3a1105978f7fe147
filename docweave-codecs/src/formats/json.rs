//! JSON codec
//!
//! The serde form of the node tree: entities carry a `type` field, fields are camelCase.

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::require_text;
use crate::vfile::VFile;
use docweave_schema::Node;

pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Node tree as JSON"
    }

    fn media_types(&self) -> &[&str] {
        &["application/json"]
    }

    fn ext_names(&self) -> &[&str] {
        &["json"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    fn sniff(&self, content: &str) -> bool {
        let trimmed = content.trim_start();
        trimmed.starts_with('{') || trimmed.starts_with('[')
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let text = require_text(file, self.name())?;
        serde_json::from_str(text).map_err(|err| CodecError::malformed("json", err))
    }

    fn encode(&self, node: &Node, _options: &EncodeOptions) -> Result<VFile, CodecError> {
        let json =
            serde_json::to_string_pretty(node).map_err(|err| CodecError::malformed("json", err))?;
        Ok(VFile::text(json).with_media_type("application/json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_schema::{Article, Block, Heading, Inline};
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_an_article() {
        let article = Node::Article(
            Article::new(vec![Block::Heading(Heading::new(
                2,
                vec![Inline::from("Intro")],
            ))])
            .with_title(vec![Inline::from("Title")]),
        );
        let file = JsonCodec.encode(&article, &EncodeOptions::default()).unwrap();
        assert!(file.as_text().unwrap().contains("\"type\": \"Heading\""));

        let decoded = JsonCodec.decode(&file, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, article);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let result = JsonCodec.decode(&VFile::text("{nope"), &DecodeOptions::default());
        assert!(matches!(result, Err(CodecError::MalformedInput { .. })));
    }
}
