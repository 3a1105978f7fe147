//! Typed content views and coercion
//!
//! `Block` and `Inline` restrict the universal [`Node`] to what a container may hold. A block
//! context (article body, list item, blockquote) holds only blocks; an inline context (paragraph,
//! heading, emphasis, table cell) holds only inlines. Codecs that produce an arbitrary node
//! sequence coerce it with [`coerce_blocks`] or [`coerce_inlines`] instead of violating that rule.
//!
//! ```text
//! Node (universal)
//!   ├─ Block:  Paragraph, Heading, List, Table, CodeBlock, CodeChunk, QuoteBlock, Figure,
//!   │          ThematicBreak, MathBlock, Collection, Include
//!   ├─ Inline: String, primitives, Emphasis, Strong, Delete, Superscript, Subscript, Link,
//!   │          Cite, Quote, CodeFragment, CodeExpression, ImageObject, MediaObject, MathFragment
//!   └─ neither: Article, ListItem, TableRow, TableCell, Person, Organization, CreativeWork
//! ```

use crate::elements::*;
use crate::error::ContentError;
use crate::node::{Node, Object};
use crate::text::ToText;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Node", into = "Node")]
pub enum Block {
    Paragraph(Paragraph),
    Heading(Heading),
    List(List),
    Table(Table),
    CodeBlock(CodeBlock),
    CodeChunk(CodeChunk),
    QuoteBlock(QuoteBlock),
    Figure(Figure),
    ThematicBreak(ThematicBreak),
    MathBlock(Math),
    Collection(Collection),
    Include(Include),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Node", into = "Node")]
pub enum Inline {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<Node>),
    Object(Object),
    Emphasis(Mark),
    Strong(Mark),
    Delete(Mark),
    Superscript(Mark),
    Subscript(Mark),
    Link(Link),
    Cite(Cite),
    Quote(Quote),
    CodeFragment(CodeFragment),
    CodeExpression(CodeExpression),
    ImageObject(ImageObject),
    MediaObject(MediaObject),
    MathFragment(Math),
}

impl TryFrom<Node> for Block {
    type Error = ContentError;

    fn try_from(node: Node) -> Result<Self, Self::Error> {
        Ok(match node {
            Node::Paragraph(p) => Block::Paragraph(p),
            Node::Heading(h) => Block::Heading(h),
            Node::List(l) => Block::List(l),
            Node::Table(t) => Block::Table(t),
            Node::CodeBlock(c) => Block::CodeBlock(c),
            Node::CodeChunk(c) => Block::CodeChunk(c),
            Node::QuoteBlock(q) => Block::QuoteBlock(q),
            Node::Figure(f) => Block::Figure(f),
            Node::ThematicBreak(t) => Block::ThematicBreak(t),
            Node::MathBlock(m) => Block::MathBlock(m),
            Node::Collection(c) => Block::Collection(c),
            Node::Include(i) => Block::Include(i),
            other => return Err(ContentError::NotBlock(Box::new(other))),
        })
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        match block {
            Block::Paragraph(p) => Node::Paragraph(p),
            Block::Heading(h) => Node::Heading(h),
            Block::List(l) => Node::List(l),
            Block::Table(t) => Node::Table(t),
            Block::CodeBlock(c) => Node::CodeBlock(c),
            Block::CodeChunk(c) => Node::CodeChunk(c),
            Block::QuoteBlock(q) => Node::QuoteBlock(q),
            Block::Figure(f) => Node::Figure(f),
            Block::ThematicBreak(t) => Node::ThematicBreak(t),
            Block::MathBlock(m) => Node::MathBlock(m),
            Block::Collection(c) => Node::Collection(c),
            Block::Include(i) => Node::Include(i),
        }
    }
}

impl TryFrom<Node> for Inline {
    type Error = ContentError;

    fn try_from(node: Node) -> Result<Self, Self::Error> {
        Ok(match node {
            Node::Null => Inline::Null,
            Node::Boolean(b) => Inline::Boolean(b),
            Node::Integer(i) => Inline::Integer(i),
            Node::Number(n) => Inline::Number(n),
            Node::String(s) => Inline::String(s),
            Node::Array(a) => Inline::Array(a),
            Node::Object(o) => Inline::Object(o),
            Node::Emphasis(m) => Inline::Emphasis(m),
            Node::Strong(m) => Inline::Strong(m),
            Node::Delete(m) => Inline::Delete(m),
            Node::Superscript(m) => Inline::Superscript(m),
            Node::Subscript(m) => Inline::Subscript(m),
            Node::Link(l) => Inline::Link(l),
            Node::Cite(c) => Inline::Cite(c),
            Node::Quote(q) => Inline::Quote(q),
            Node::CodeFragment(c) => Inline::CodeFragment(c),
            Node::CodeExpression(c) => Inline::CodeExpression(c),
            Node::ImageObject(i) => Inline::ImageObject(i),
            Node::MediaObject(m) => Inline::MediaObject(m),
            Node::MathFragment(m) => Inline::MathFragment(m),
            other => return Err(ContentError::NotInline(Box::new(other))),
        })
    }
}

impl From<Inline> for Node {
    fn from(inline: Inline) -> Self {
        match inline {
            Inline::Null => Node::Null,
            Inline::Boolean(b) => Node::Boolean(b),
            Inline::Integer(i) => Node::Integer(i),
            Inline::Number(n) => Node::Number(n),
            Inline::String(s) => Node::String(s),
            Inline::Array(a) => Node::Array(a),
            Inline::Object(o) => Node::Object(o),
            Inline::Emphasis(m) => Node::Emphasis(m),
            Inline::Strong(m) => Node::Strong(m),
            Inline::Delete(m) => Node::Delete(m),
            Inline::Superscript(m) => Node::Superscript(m),
            Inline::Subscript(m) => Node::Subscript(m),
            Inline::Link(l) => Node::Link(l),
            Inline::Cite(c) => Node::Cite(c),
            Inline::Quote(q) => Node::Quote(q),
            Inline::CodeFragment(c) => Node::CodeFragment(c),
            Inline::CodeExpression(c) => Node::CodeExpression(c),
            Inline::ImageObject(i) => Node::ImageObject(i),
            Inline::MediaObject(m) => Node::MediaObject(m),
            Inline::MathFragment(m) => Node::MathFragment(m),
        }
    }
}

impl From<&str> for Inline {
    fn from(text: &str) -> Self {
        Inline::String(text.to_string())
    }
}

impl From<String> for Inline {
    fn from(text: String) -> Self {
        Inline::String(text)
    }
}

impl Inline {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Inline::String(text) if text.trim().is_empty())
    }
}

impl Block {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph(Paragraph::new(content))
    }
}

/// Result of sorting one node into the content slot it can occupy
enum Slot {
    Block(Block),
    Blocks(Vec<Block>),
    Inline(Inline),
}

fn slot(node: Node) -> Slot {
    let node = match Block::try_from(node) {
        Ok(block) => return Slot::Block(block),
        Err(err) => err.into_node(),
    };
    let node = match Inline::try_from(node) {
        Ok(inline) => return Slot::Inline(inline),
        Err(err) => err.into_node(),
    };
    match node {
        Node::Article(article) => Slot::Blocks(article.content),
        Node::ListItem(item) => Slot::Blocks(item.content),
        other => Slot::Inline(Inline::String(other.to_text())),
    }
}

/// Coerce a node sequence into valid block content
///
/// Runs of inline nodes are flushed into a synthesized paragraph immediately before the next
/// block, so reading order is preserved and no block ends up nested in a paragraph. Runs that
/// are nothing but whitespace are dropped.
pub fn coerce_blocks(nodes: Vec<Node>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut run: Vec<Inline> = Vec::new();

    for node in nodes {
        match slot(node) {
            Slot::Block(block) => {
                flush_run(&mut run, &mut blocks);
                blocks.push(block);
            }
            Slot::Blocks(more) => {
                flush_run(&mut run, &mut blocks);
                blocks.extend(more);
            }
            Slot::Inline(inline) => run.push(inline),
        }
    }
    flush_run(&mut run, &mut blocks);
    blocks
}

fn flush_run(run: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
    if run.is_empty() {
        return;
    }
    let content = merge_strings(std::mem::take(run));
    if content.iter().all(Inline::is_whitespace) {
        return;
    }
    blocks.push(Block::paragraph(content));
}

/// Coerce a node sequence into valid inline content
///
/// Paragraphs and headings contribute their inline content; other blocks contribute their plain
/// text.
pub fn coerce_inlines(nodes: Vec<Node>) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for node in nodes {
        match slot(node) {
            Slot::Inline(inline) => inlines.push(inline),
            Slot::Block(block) => push_block_inlines(block, &mut inlines),
            Slot::Blocks(blocks) => {
                for block in blocks {
                    push_block_inlines(block, &mut inlines);
                }
            }
        }
    }
    merge_strings(inlines)
}

fn push_block_inlines(block: Block, inlines: &mut Vec<Inline>) {
    match block {
        Block::Paragraph(p) => inlines.extend(p.content),
        Block::Heading(h) => inlines.extend(h.content),
        other => inlines.push(Inline::String(other.to_text())),
    }
}

/// Concatenate adjacent strings and drop empty ones
pub fn merge_strings(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match (merged.last_mut(), inline) {
            (_, Inline::String(text)) if text.is_empty() => {}
            (Some(Inline::String(previous)), Inline::String(text)) => previous.push_str(&text),
            (_, inline) => merged.push(inline),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inline_runs_are_wrapped_around_blocks() {
        let nodes = vec![
            Node::from("before "),
            Node::Emphasis(Mark::new(vec![Inline::from("em")])),
            Node::ThematicBreak(ThematicBreak::default()),
            Node::from("after"),
        ];
        let blocks = coerce_blocks(nodes);
        assert_eq!(
            blocks,
            vec![
                Block::paragraph(vec![
                    Inline::from("before "),
                    Inline::Emphasis(Mark::new(vec![Inline::from("em")])),
                ]),
                Block::ThematicBreak(ThematicBreak::default()),
                Block::paragraph(vec![Inline::from("after")]),
            ]
        );
    }

    #[test]
    fn whitespace_runs_do_not_become_paragraphs() {
        let nodes = vec![
            Node::from("  "),
            Node::ThematicBreak(ThematicBreak::default()),
            Node::from("\n"),
        ];
        assert_eq!(
            coerce_blocks(nodes),
            vec![Block::ThematicBreak(ThematicBreak::default())]
        );
    }

    #[test]
    fn blocks_flatten_to_inlines() {
        let nodes = vec![
            Node::Paragraph(Paragraph::new(vec![Inline::from("one ")])),
            Node::from("two"),
            Node::CodeBlock(CodeBlock {
                text: " three".into(),
                ..Default::default()
            }),
        ];
        assert_eq!(coerce_inlines(nodes), vec![Inline::from("one two three")]);
    }

    #[test]
    fn primitives_are_inline_content() {
        assert_eq!(Inline::try_from(Node::Boolean(true)), Ok(Inline::Boolean(true)));
        assert!(Block::try_from(Node::Boolean(true)).is_err());
    }

    #[test]
    fn rejected_nodes_are_handed_back() {
        let err = Block::try_from(Node::Integer(4)).unwrap_err();
        assert_eq!(err.to_string(), "`Integer` cannot be used as block content");
        assert_eq!(err.into_node(), Node::Integer(4));
    }
}
