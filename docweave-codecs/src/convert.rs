//! One-call conversion between formats
//!
//! The facade is the only place that touches the file system: it reads inputs into [`VFile`]s,
//! hands them to the default registry, and writes encoded output where asked.

use crate::codec::{DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::registry::{default_registry, is_path};
use crate::vfile::VFile;
use docweave_schema::Node;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Input format, overriding the input's path and content
    pub from: Option<String>,
    /// Output format, overriding the output path's extension
    pub to: Option<String>,
    pub decode: DecodeOptions,
    pub encode: EncodeOptions,
}

impl ConvertOptions {
    pub fn to_format(format: impl Into<String>) -> Self {
        Self {
            to: Some(format.into()),
            ..Default::default()
        }
    }

    pub fn from_format(mut self, format: impl Into<String>) -> Self {
        self.from = Some(format.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutput {
    InMemory(String),
    File(PathBuf),
}

/// Load an input given as a path, a URL, or the content itself
///
/// URLs stay as text for the `http` codec to fetch. A path-like input that cannot be read is an
/// error rather than being decoded as content.
pub fn read(input: &str) -> Result<VFile, CodecError> {
    if is_path(input) {
        return Ok(VFile::read(input)?);
    }
    Ok(VFile::text(input))
}

/// Decode an input (path, URL or content) with the default registry
pub fn decode(input: &str, options: &DecodeOptions) -> Result<Node, CodecError> {
    let file = read(input)?;
    decode_file(&file, options)
}

pub fn decode_file(file: &VFile, options: &DecodeOptions) -> Result<Node, CodecError> {
    tracing::debug!(target: "docweave::decode", path = ?file.path, format = ?options.format, "decoding");
    default_registry().decode(file, options)
}

/// Encode a node with the default registry; needs a `file_path` or `format`
pub fn encode(node: &Node, options: &EncodeOptions) -> Result<VFile, CodecError> {
    tracing::debug!(target: "docweave::encode", path = ?options.file_path, format = ?options.format, "encoding");
    default_registry().encode(node, options)
}

/// Decode `input` and encode it to `output`, or to memory when no output is given
///
/// Binary formats (PDF) can only be written to a file.
pub fn convert(
    input: &str,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<ConvertOutput, CodecError> {
    let decode_options = DecodeOptions {
        format: options.from.clone().or_else(|| options.decode.format.clone()),
        ..options.decode.clone()
    };
    let node = decode(input, &decode_options)?;

    let encode_options = EncodeOptions {
        file_path: output.map(Path::to_path_buf),
        format: options.to.clone().or_else(|| options.encode.format.clone()),
        ..options.encode.clone()
    };
    let file = encode(&node, &encode_options)?;

    match output {
        Some(path) => {
            file.write(path)?;
            tracing::debug!(target: "docweave::encode", path = %path.display(), "wrote output");
            Ok(ConvertOutput::File(path.to_path_buf()))
        }
        None => file.into_text().map(ConvertOutput::InMemory).ok_or_else(|| {
            CodecError::unsupported(
                encode_options.format.unwrap_or_default(),
                "binary output without an output path",
            )
        }),
    }
}
