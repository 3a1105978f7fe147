//! Markdown serialization (Node → Markdown)
//!
//! Pipeline: Node blocks → Comrak AST → Markdown string
//!
//! Anything CommonMark has no node for is emitted as raw `HtmlInline`/`HtmlBlock` literals, which
//! comrak's formatter writes through untouched: extension syntax, attribute annotations, math
//! delimiters and pipe tables.

use super::attrs;
use super::comrak_options;
use super::extensions::{Extension, ExtensionKind};
use crate::codec::EncodeOptions;
use crate::error::CodecError;
use crate::math::MathConverter;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeValue,
};
use comrak::{format_commonmark, Arena};
use docweave_schema::*;
use std::cell::RefCell;
use std::sync::Arc;

const TARGET: &str = "docweave::encode";

/// Encode an article, with its metadata as YAML front matter
pub(crate) fn encode_article(article: &Article, options: &EncodeOptions) -> Result<String, CodecError> {
    let front_matter = front_matter(article)?;
    let body = encode_blocks(&article.content, options)?;
    Ok(format!("{front_matter}{body}"))
}

/// Encode blocks without any front matter
pub(crate) fn encode_blocks(blocks: &[Block], options: &EncodeOptions) -> Result<String, CodecError> {
    let arena = Arena::new();
    let builder = Builder {
        arena: &arena,
        math: options.math_converter(),
    };
    let root = builder.node(NodeValue::Document);
    for block in blocks {
        builder.block(root, block);
    }
    render(root, options.markdown_width)
}

fn render<'a>(root: &'a AstNode<'a>, width: usize) -> Result<String, CodecError> {
    let mut output = Vec::new();
    format_commonmark(root, &comrak_options(width), &mut output)?;
    let markdown = String::from_utf8(output)
        .map_err(|err| CodecError::malformed("md", format!("formatter produced invalid UTF-8: {err}")))?;

    // Comrak separates consecutive lists with this comment
    Ok(markdown.replace("<!-- end list -->\n\n", ""))
}

fn front_matter(article: &Article) -> Result<String, CodecError> {
    let value = serde_json::to_value(article).map_err(|err| CodecError::malformed("md", err))?;
    let serde_json::Value::Object(mut fields) = value else {
        return Ok(String::new());
    };
    fields.remove("type");
    fields.remove("content");

    // A plain-text title reads better as a YAML string than a one-item list
    if let Some(serde_json::Value::Array(title)) = fields.get("title") {
        if let [serde_json::Value::String(text)] = title.as_slice() {
            let text = text.clone();
            fields.insert("title".to_string(), serde_json::Value::String(text));
        }
    }

    if fields.is_empty() {
        return Ok(String::new());
    }
    let yaml = serde_yaml::to_string(&fields).map_err(|err| CodecError::malformed("md", err))?;
    Ok(format!("---\n{yaml}---\n\n"))
}

struct Builder<'a> {
    arena: &'a Arena<AstNode<'a>>,
    math: Arc<dyn MathConverter>,
}

impl<'a> Builder<'a> {
    fn node(&self, value: NodeValue) -> &'a AstNode<'a> {
        self.arena
            .alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
    }

    fn append(&self, parent: &'a AstNode<'a>, value: NodeValue) -> &'a AstNode<'a> {
        let node = self.node(value);
        parent.append(node);
        node
    }

    fn text(&self, parent: &'a AstNode<'a>, text: &str) {
        if !text.is_empty() {
            self.append(parent, NodeValue::Text(text.to_string()));
        }
    }

    fn raw_inline(&self, parent: &'a AstNode<'a>, literal: impl Into<String>) {
        self.append(parent, NodeValue::HtmlInline(literal.into()));
    }

    fn raw_block(&self, parent: &'a AstNode<'a>, literal: impl Into<String>) {
        self.append(
            parent,
            NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: literal.into(),
            }),
        );
    }

    fn block(&self, parent: &'a AstNode<'a>, block: &Block) {
        match block {
            Block::Paragraph(paragraph) => {
                if !paragraph.is_empty() {
                    let node = self.append(parent, NodeValue::Paragraph);
                    self.inlines(node, &paragraph.content);
                }
            }
            Block::Heading(heading) => {
                let node = self.append(
                    parent,
                    NodeValue::Heading(NodeHeading {
                        level: heading.depth.clamp(1, 6),
                        setext: false,
                    }),
                );
                self.inlines(node, &heading.content);
                if let Some(id) = &heading.id {
                    let annotation = attrs::collect(None, Some(id.as_str()), &Meta::new());
                    self.raw_inline(node, format!(" {}", attrs::format(&annotation)));
                }
            }
            Block::List(list) => self.list(parent, list),
            Block::Table(table) => self.table(parent, table),
            Block::CodeBlock(code) => self.code_block(
                parent,
                code.programming_language.as_deref(),
                &code.text,
                attrs::collect(None, code.id.as_deref(), &code.meta),
            ),
            Block::CodeChunk(chunk) => self.chunk(parent, chunk),
            Block::QuoteBlock(quote) => {
                let node = self.append(parent, NodeValue::BlockQuote);
                for block in &quote.content {
                    self.block(node, block);
                }
            }
            Block::Figure(figure) => {
                let mut fence = Extension::new(ExtensionKind::Figure);
                if let Some(label) = &figure.label {
                    fence = fence.with_argument(label.as_str());
                }
                fence = fence.with_properties(attrs::collect(None, figure.id.as_deref(), &Meta::new()));
                self.raw_block(parent, fence.fence_open());
                for node in &figure.content {
                    self.node_as_block(parent, node);
                }
                if !figure.caption.is_empty() {
                    self.append(parent, NodeValue::ThematicBreak);
                    for block in &figure.caption {
                        self.block(parent, block);
                    }
                }
                self.raw_block(parent, fence.fence_close());
            }
            Block::ThematicBreak(_) => {
                self.append(parent, NodeValue::ThematicBreak);
            }
            Block::MathBlock(math) => {
                let tex = self.tex(math).replace('\n', " ");
                let node = self.append(parent, NodeValue::Paragraph);
                self.raw_inline(node, format!("$${}$$", tex.trim()));
            }
            Block::Collection(collection) => {
                for part in &collection.parts {
                    self.node_as_block(parent, part);
                }
            }
            Block::Include(include) => {
                let mut props = Meta::new();
                if let Some(media_type) = &include.media_type {
                    props.insert("mediaType".to_string(), media_type.clone());
                }
                let fence = Extension::new(ExtensionKind::Include)
                    .with_argument(include.source.as_str())
                    .with_properties(props);
                self.raw_block(parent, fence.fence_open());
                for block in &include.content {
                    self.block(parent, block);
                }
                self.raw_block(parent, fence.fence_close());
            }
        }
    }

    /// Blocks stay blocks; anything inline-like gets a paragraph of its own
    fn node_as_block(&self, parent: &'a AstNode<'a>, node: &Node) {
        match Block::try_from(node.clone()) {
            Ok(block) => self.block(parent, &block),
            Err(err) => {
                let inline = match Inline::try_from(err.into_node()) {
                    Ok(inline) => inline,
                    Err(err) => Inline::String(err.into_node().to_text()),
                };
                let paragraph = self.append(parent, NodeValue::Paragraph);
                self.inline(paragraph, &inline);
            }
        }
    }

    fn list(&self, parent: &'a AstNode<'a>, list: &List) {
        let list_type = if list.is_ordered() {
            ListType::Ordered
        } else {
            ListType::Bullet
        };
        let tight = list.items.iter().all(|item| item.content.len() <= 1);
        let list_attrs = NodeList {
            list_type,
            marker_offset: 0,
            padding: 0,
            start: 1,
            delimiter: ListDelimType::Period,
            bullet_char: b'-',
            tight,
        };
        let node = self.append(parent, NodeValue::List(list_attrs));

        for item in &list.items {
            let item_node = self.append(node, NodeValue::Item(list_attrs));
            if let Some(checked) = item.is_checked {
                let marker = if checked { "[x] " } else { "[ ] " };
                match item.content.first() {
                    Some(Block::Paragraph(paragraph)) => {
                        let para = self.append(item_node, NodeValue::Paragraph);
                        self.raw_inline(para, marker);
                        self.inlines(para, &paragraph.content);
                        for block in &item.content[1..] {
                            self.block(item_node, block);
                        }
                        continue;
                    }
                    _ => {
                        let para = self.append(item_node, NodeValue::Paragraph);
                        self.raw_inline(para, marker.trim_end());
                    }
                }
            }
            for block in &item.content {
                self.block(item_node, block);
            }
        }
    }

    /// A GFM pipe table; the first row is always the header
    fn table(&self, parent: &'a AstNode<'a>, table: &Table) {
        let Some(columns) = table.rows.iter().map(|row| row.cells.len()).max() else {
            return;
        };
        if columns == 0 {
            return;
        }

        let mut lines = Vec::with_capacity(table.rows.len() + 1);
        for (index, row) in table.rows.iter().enumerate() {
            let mut cells: Vec<String> = row.cells.iter().map(|cell| self.cell_text(cell)).collect();
            cells.resize(columns, String::new());
            lines.push(format!("| {} |", cells.join(" | ")));
            if index == 0 {
                lines.push(format!("|{}", " --- |".repeat(columns)));
            }
        }
        self.raw_block(parent, lines.join("\n"));
    }

    fn cell_text(&self, cell: &TableCell) -> String {
        let root = self.node(NodeValue::Document);
        let paragraph = self.append(root, NodeValue::Paragraph);
        self.inlines(paragraph, &cell.content);
        let text = match render(root, 0) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(target: TARGET, error = %err, "table cell could not be formatted, using plain text");
                cell.content.to_text()
            }
        };
        escape_pipes(text.trim().replace('\n', " ").as_str())
    }

    fn code_block(&self, parent: &'a AstNode<'a>, lang: Option<&str>, text: &str, annotation: Meta) {
        let mut info = lang.unwrap_or_default().to_string();
        let annotation = attrs::format(&annotation);
        if !annotation.is_empty() {
            if !info.is_empty() {
                info.push(' ');
            }
            info.push_str(&annotation);
        }
        let mut literal = text.to_string();
        if !literal.ends_with('\n') {
            literal.push('\n');
        }
        self.append(
            parent,
            NodeValue::CodeBlock(NodeCodeBlock {
                fenced: true,
                fence_char: b'`',
                fence_length: 3,
                fence_offset: 0,
                info,
                literal,
            }),
        );
    }

    fn chunk(&self, parent: &'a AstNode<'a>, chunk: &CodeChunk) {
        let mut fence = Extension::new(ExtensionKind::Chunk);
        if let Some(label) = &chunk.label {
            fence = fence.with_argument(label.as_str());
        }
        fence = fence.with_properties(attrs::collect(None, chunk.id.as_deref(), &Meta::new()));

        if !chunk.caption.is_empty() {
            tracing::warn!(target: TARGET, "code chunk caption has no markdown form, dropped");
        }

        self.raw_block(parent, fence.fence_open());
        self.code_block(
            parent,
            chunk.programming_language.as_deref(),
            &chunk.text,
            chunk.meta.clone(),
        );
        for (index, output) in chunk.outputs.iter().enumerate() {
            if index > 0 {
                self.append(parent, NodeValue::ThematicBreak);
            }
            self.node_as_block(parent, output);
        }
        self.raw_block(parent, fence.fence_close());
    }

    fn inlines(&self, parent: &'a AstNode<'a>, inlines: &[Inline]) {
        for inline in inlines {
            self.inline(parent, inline);
        }
    }

    fn mark(&self, parent: &'a AstNode<'a>, value: NodeValue, mark: &Mark) {
        let node = self.append(parent, value);
        self.inlines(node, &mark.content);
    }

    fn inline(&self, parent: &'a AstNode<'a>, inline: &Inline) {
        match inline {
            Inline::String(text) => self.text(parent, text),
            Inline::Null => self.raw_inline(parent, Extension::new(ExtensionKind::Null).to_inline()),
            Inline::Boolean(true) => self.raw_inline(parent, Extension::new(ExtensionKind::True).to_inline()),
            Inline::Boolean(false) => self.raw_inline(parent, Extension::new(ExtensionKind::False).to_inline()),
            Inline::Integer(value) => self.raw_inline(
                parent,
                Extension::new(ExtensionKind::Number).with_content(value.to_string()).to_inline(),
            ),
            Inline::Number(value) => {
                let text = serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
                self.raw_inline(
                    parent,
                    Extension::new(ExtensionKind::Number).with_content(text).to_inline(),
                );
            }
            Inline::Array(items) => {
                let json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
                self.raw_inline(
                    parent,
                    Extension::new(ExtensionKind::Array)
                        .with_content(strip_outer(&json))
                        .to_inline(),
                );
            }
            Inline::Object(object) => {
                let json = serde_json::to_string(object).unwrap_or_else(|_| "{}".to_string());
                self.raw_inline(
                    parent,
                    Extension::new(ExtensionKind::Object)
                        .with_content(strip_outer(&json))
                        .to_inline(),
                );
            }
            Inline::Emphasis(mark) => self.mark(parent, NodeValue::Emph, mark),
            Inline::Strong(mark) => self.mark(parent, NodeValue::Strong, mark),
            Inline::Delete(mark) => self.mark(parent, NodeValue::Strikethrough, mark),
            Inline::Superscript(mark) => self.mark(parent, NodeValue::Superscript, mark),
            Inline::Subscript(mark) => {
                self.raw_inline(parent, "<sub>");
                self.inlines(parent, &mark.content);
                self.raw_inline(parent, "</sub>");
            }
            Inline::Link(link) => {
                let node = self.append(
                    parent,
                    NodeValue::Link(NodeLink {
                        url: link.target.clone(),
                        title: link.title.clone().unwrap_or_default(),
                    }),
                );
                self.inlines(node, &link.content);
                self.annotation(parent, attrs::collect(None, link.id.as_deref(), &link.meta));
            }
            Inline::Cite(cite) => {
                let node = self.append(
                    parent,
                    NodeValue::Link(NodeLink {
                        url: format!("#{}", cite.target),
                        title: String::new(),
                    }),
                );
                if cite.content.is_empty() {
                    self.text(node, &cite.target);
                } else {
                    self.inlines(node, &cite.content);
                }
            }
            Inline::Quote(quote) => {
                self.raw_inline(parent, Extension::new(ExtensionKind::Quote).to_inline());
                let node = self.append(
                    parent,
                    NodeValue::Link(NodeLink {
                        url: quote.cite.clone().unwrap_or_default(),
                        title: String::new(),
                    }),
                );
                self.inlines(node, &quote.content);
            }
            Inline::CodeFragment(code) => {
                self.append(
                    parent,
                    NodeValue::Code(NodeCode {
                        num_backticks: 1,
                        literal: code.text.clone(),
                    }),
                );
                self.annotation(
                    parent,
                    attrs::collect(code.programming_language.as_deref(), None, &code.meta),
                );
            }
            Inline::CodeExpression(expr) => {
                if expr.output.is_some() {
                    tracing::warn!(target: TARGET, "code expression output has no markdown form, dropped");
                }
                let props = attrs::collect(expr.programming_language.as_deref(), None, &Meta::new());
                self.raw_inline(
                    parent,
                    Extension::new(ExtensionKind::Expr)
                        .with_content(expr.text.as_str())
                        .with_properties(props)
                        .to_inline(),
                );
            }
            Inline::ImageObject(image) => {
                let node = self.append(
                    parent,
                    NodeValue::Image(NodeLink {
                        url: image.content_url.clone(),
                        title: image.title.clone().unwrap_or_default(),
                    }),
                );
                if let Some(caption) = &image.caption {
                    self.text(node, caption);
                }
                self.annotation(parent, attrs::collect(None, image.id.as_deref(), &image.meta));
            }
            Inline::MediaObject(media) => {
                self.append(
                    parent,
                    NodeValue::Image(NodeLink {
                        url: media.content_url.clone(),
                        title: String::new(),
                    }),
                );
                self.annotation(parent, attrs::collect(None, media.id.as_deref(), &Meta::new()));
            }
            Inline::MathFragment(math) => {
                let tex = self.tex(math);
                self.raw_inline(parent, format!("${}$", tex.trim()));
            }
        }
    }

    fn annotation(&self, parent: &'a AstNode<'a>, annotation: Meta) {
        let text = attrs::format(&annotation);
        if !text.is_empty() {
            self.raw_inline(parent, text);
        }
    }

    /// The TeX for some math, converting from its declared language if needed
    fn tex(&self, math: &Math) -> String {
        if math.is_tex() {
            return math.text.clone();
        }
        let from = math.math_language.as_deref().unwrap_or("tex");
        self.math.convert(&math.text, from, "tex").unwrap_or_else(|err| {
            tracing::warn!(target: TARGET, error = %err, "math conversion failed, keeping source");
            math.text.clone()
        })
    }
}

/// `[1,2]` → `1,2`
fn strip_outer(json: &str) -> String {
    let mut chars = json.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// Escape `|` unless the formatter already did
fn escape_pipes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;
    for c in text.chars() {
        if c == '|' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(blocks: Vec<Block>) -> String {
        encode_blocks(&blocks, &EncodeOptions::to_format("md")).unwrap()
    }

    #[test]
    fn heading_id_becomes_annotation() {
        let heading = Heading {
            id: Some("intro".into()),
            ..Heading::new(2, vec![Inline::from("Intro")])
        };
        assert_eq!(encode(vec![Block::Heading(heading)]), "## Intro {id=intro}\n");
    }

    #[test]
    fn empty_paragraphs_are_dropped() {
        let markdown = encode(vec![
            Block::paragraph(vec![Inline::from("  ")]),
            Block::paragraph(vec![Inline::from("kept")]),
        ]);
        assert_eq!(markdown, "kept\n");
    }

    #[test]
    fn primitives_use_extension_syntax() {
        let markdown = encode(vec![Block::paragraph(vec![
            Inline::Integer(3),
            Inline::from(" "),
            Inline::Boolean(true),
            Inline::from(" "),
            Inline::Array(vec![Node::Integer(1), Node::Integer(2)]),
        ])]);
        assert_eq!(markdown, "!number[3] !true !array[1,2]\n");
    }

    #[test]
    fn expression_content_is_escaped() {
        let markdown = encode(vec![Block::paragraph(vec![Inline::CodeExpression(
            CodeExpression {
                text: "a*b*c".into(),
                programming_language: Some("py".into()),
                output: None,
            },
        )])]);
        assert_eq!(markdown, "!expr[a\\*b\\*c]{lang=py}\n");
    }

    #[test]
    fn subscript_is_html() {
        let markdown = encode(vec![Block::paragraph(vec![
            Inline::from("H"),
            Inline::Subscript(Mark::new(vec![Inline::from("2")])),
            Inline::from("O"),
        ])]);
        assert_eq!(markdown, "H<sub>2</sub>O\n");
    }

    #[test]
    fn table_is_a_pipe_table() {
        let table = Table {
            rows: vec![
                TableRow {
                    cells: vec![TableCell::new(vec![Inline::from("a")]), TableCell::new(vec![Inline::from("b")])],
                    row_type: Some(TableRowType::Header),
                },
                TableRow {
                    cells: vec![TableCell::new(vec![Inline::from("1")])],
                    row_type: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            encode(vec![Block::Table(table)]),
            "| a | b |\n| --- | --- |\n| 1 |  |\n"
        );
    }

    #[test]
    fn pipes_are_escaped_once() {
        assert_eq!(escape_pipes("a | b"), "a \\| b");
        assert_eq!(escape_pipes("a \\| b"), "a \\| b");
    }

    #[test]
    fn front_matter_collapses_plain_title() {
        let article = Article::new(Vec::new()).with_title(vec![Inline::from("Hello")]);
        assert_eq!(front_matter(&article).unwrap(), "---\ntitle: Hello\n---\n\n");
        assert_eq!(front_matter(&Article::default()).unwrap(), "");
    }
}
