//! Jupyter notebook codec
//!
//! Markdown cells go through the markdown codec; code cells become `CodeChunk`s whose outputs
//! map as follows:
//!
//! | Output | Node |
//! |--------|------|
//! | `stream` | string |
//! | `execute_result` / `display_data` with `image/png` | `ImageObject` with a data URI |
//! | `execute_result` / `display_data` with `text/plain` | string |
//! | `error` | `ename: evalue` string |
//!
//! Encoding groups consecutive non-chunk blocks into one markdown cell each. The notebook's
//! kernel language becomes every chunk's language on decode, and is taken from the first chunk
//! on encode.
//!
//! Lossy: outputs other than strings and images are written as `text/plain` and come back as
//! strings, so an `Integer(2)` output decodes as `"2"`.

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats::{as_article, markdown, require_text};
use crate::vfile::VFile;
use docweave_schema::*;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const TARGET: &str = "docweave::decode";
const PNG_DATA_URI: &str = "data:image/png;base64,";

#[derive(Debug, Serialize, Deserialize)]
struct Notebook {
    cells: Vec<Cell>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default = "nbformat")]
    nbformat: u32,
    #[serde(default)]
    nbformat_minor: u32,
}

fn nbformat() -> u32 {
    4
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum Cell {
    Markdown {
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(deserialize_with = "multiline", serialize_with = "lines")]
        source: String,
    },
    Code {
        #[serde(default)]
        execution_count: Option<u32>,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(default)]
        outputs: Vec<Output>,
        #[serde(deserialize_with = "multiline", serialize_with = "lines")]
        source: String,
    },
    Raw {
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(deserialize_with = "multiline", serialize_with = "lines")]
        source: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
enum Output {
    Stream {
        name: String,
        #[serde(deserialize_with = "multiline", serialize_with = "lines")]
        text: String,
    },
    ExecuteResult {
        #[serde(default)]
        execution_count: Option<u32>,
        data: BTreeMap<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    DisplayData {
        data: BTreeMap<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// Notebook text fields are either one string or a list of lines
fn multiline<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(String),
        Lines(Vec<String>),
    }
    Ok(match Repr::deserialize(deserializer)? {
        Repr::One(text) => text,
        Repr::Lines(lines) => lines.concat(),
    })
}

fn lines<S>(text: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(text.split_inclusive('\n'))
}

/// A mime bundle entry as text
fn bundle_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(lines) => Some(lines.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

pub struct IpynbCodec;

impl Codec for IpynbCodec {
    fn name(&self) -> &str {
        "ipynb"
    }

    fn description(&self) -> &str {
        "Jupyter notebooks"
    }

    fn media_types(&self) -> &[&str] {
        &["application/x-ipynb+json"]
    }

    fn ext_names(&self) -> &[&str] {
        &["ipynb"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    fn sniff(&self, content: &str) -> bool {
        content.trim_start().starts_with('{') && content.contains("\"nbformat\"")
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        let text = require_text(file, self.name())?;
        let notebook: Notebook =
            serde_json::from_str(text).map_err(|err| CodecError::malformed("ipynb", err))?;
        Ok(Node::Article(decode_notebook(notebook)))
    }

    fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<VFile, CodecError> {
        let notebook = encode_notebook(&as_article(node), options)?;
        let json = serde_json::to_string_pretty(&notebook)
            .map_err(|err| CodecError::malformed("ipynb", err))?;
        Ok(VFile::text(json).with_media_type("application/x-ipynb+json"))
    }
}

fn kernel_language(metadata: &Map<String, Value>) -> Option<String> {
    metadata
        .get("kernelspec")
        .and_then(|spec| spec.get("language"))
        .or_else(|| metadata.get("language_info").and_then(|info| info.get("name")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn decode_notebook(notebook: Notebook) -> Article {
    let language = kernel_language(&notebook.metadata);
    let mut article = Article::default();

    if let Some(title) = notebook.metadata.get("title").and_then(Value::as_str) {
        article.title = Some(vec![Inline::from(title)]);
    }

    for cell in notebook.cells {
        match cell {
            Cell::Markdown { source, .. } => {
                article.content.extend(markdown::decode_fragment(&source));
            }
            Cell::Code {
                source,
                outputs,
                execution_count,
                ..
            } => {
                let mut meta = Meta::new();
                if let Some(count) = execution_count {
                    meta.insert("executionCount".to_string(), count.to_string());
                }
                article.content.push(Block::CodeChunk(CodeChunk {
                    text: source,
                    programming_language: language.clone(),
                    meta,
                    outputs: outputs.into_iter().filter_map(decode_output).collect(),
                    ..Default::default()
                }));
            }
            Cell::Raw { source, .. } => {
                article.content.push(Block::CodeBlock(CodeBlock {
                    text: source,
                    ..Default::default()
                }));
            }
        }
    }
    article
}

fn decode_output(output: Output) -> Option<Node> {
    match output {
        Output::Stream { text, .. } => Some(Node::String(text)),
        Output::ExecuteResult { data, .. } | Output::DisplayData { data, .. } => {
            if let Some(png) = data.get("image/png").and_then(bundle_text) {
                let base64: String = png.split_whitespace().collect();
                return Some(Node::ImageObject(ImageObject {
                    media_type: Some("image/png".to_string()),
                    ..ImageObject::new(format!("{PNG_DATA_URI}{base64}"))
                }));
            }
            if let Some(text) = data.get("text/plain").and_then(bundle_text) {
                return Some(Node::String(text));
            }
            tracing::warn!(
                target: TARGET,
                types = ?data.keys().collect::<Vec<_>>(),
                "notebook output has no supported mime type, dropped"
            );
            None
        }
        Output::Error { ename, evalue, .. } => Some(Node::String(format!("{ename}: {evalue}"))),
    }
}

fn encode_notebook(article: &Article, options: &EncodeOptions) -> Result<Notebook, CodecError> {
    let mut cells = Vec::new();
    let mut pending: Vec<Block> = Vec::new();
    let mut language = None;

    for block in &article.content {
        match block {
            Block::CodeChunk(chunk) => {
                flush_markdown(&mut pending, &mut cells, options)?;
                if language.is_none() {
                    language = chunk.programming_language.clone();
                }
                cells.push(encode_chunk(chunk));
            }
            other => pending.push(other.clone()),
        }
    }
    flush_markdown(&mut pending, &mut cells, options)?;

    let mut metadata = Map::new();
    if let Some(title) = &article.title {
        metadata.insert("title".to_string(), Value::String(title.to_text()));
    }
    if let Some(language) = language {
        metadata.insert(
            "kernelspec".to_string(),
            serde_json::json!({ "language": language, "name": language, "display_name": language }),
        );
        metadata.insert(
            "language_info".to_string(),
            serde_json::json!({ "name": language }),
        );
    }

    Ok(Notebook {
        cells,
        metadata,
        nbformat: 4,
        nbformat_minor: 4,
    })
}

fn flush_markdown(
    pending: &mut Vec<Block>,
    cells: &mut Vec<Cell>,
    options: &EncodeOptions,
) -> Result<(), CodecError> {
    if pending.is_empty() {
        return Ok(());
    }
    let source = markdown::encode_fragment(pending, options)?;
    pending.clear();
    if !source.trim().is_empty() {
        cells.push(Cell::Markdown {
            metadata: Map::new(),
            source: source.trim_end().to_string(),
        });
    }
    Ok(())
}

fn encode_chunk(chunk: &CodeChunk) -> Cell {
    let execution_count = chunk
        .meta
        .get("executionCount")
        .and_then(|count| count.parse().ok());
    Cell::Code {
        execution_count,
        metadata: Map::new(),
        outputs: chunk.outputs.iter().map(|node| encode_output(node, execution_count)).collect(),
        source: chunk.text.clone(),
    }
}

fn encode_output(node: &Node, execution_count: Option<u32>) -> Output {
    match node {
        Node::String(text) => Output::Stream {
            name: "stdout".to_string(),
            text: text.clone(),
        },
        Node::ImageObject(image) if image.content_url.starts_with(PNG_DATA_URI) => {
            let mut data = BTreeMap::new();
            data.insert(
                "image/png".to_string(),
                Value::String(image.content_url[PNG_DATA_URI.len()..].to_string()),
            );
            Output::DisplayData {
                data,
                metadata: Map::new(),
            }
        }
        other => {
            let mut data = BTreeMap::new();
            data.insert("text/plain".to_string(), Value::String(other.to_text()));
            Output::ExecuteResult {
                execution_count,
                data,
                metadata: Map::new(),
            }
        }
    }
}
