//! Plain text extraction
//!
//! Used wherever a format has no place for structure: alt text, citation labels, the `txt`
//! codec, and coercing blocks into inline slots.

use crate::content::{Block, Inline};
use crate::elements::*;
use crate::node::Node;

pub trait ToText {
    fn to_text(&self) -> String;
}

impl<T: ToText> ToText for [T] {
    fn to_text(&self) -> String {
        self.iter().map(ToText::to_text).collect()
    }
}

impl<T: ToText> ToText for Vec<T> {
    fn to_text(&self) -> String {
        self.as_slice().to_text()
    }
}

/// Join block texts with blank lines between them
fn blocks_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(ToText::to_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn nodes_text(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(ToText::to_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl ToText for Inline {
    fn to_text(&self) -> String {
        match self {
            Inline::Null => "null".to_string(),
            Inline::Boolean(value) => value.to_string(),
            Inline::Integer(value) => value.to_string(),
            Inline::Number(value) => value.to_string(),
            Inline::String(text) => text.clone(),
            Inline::Array(items) => items
                .iter()
                .map(ToText::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            Inline::Object(object) => object
                .iter()
                .map(|(key, value)| format!("{key}: {}", value.to_text()))
                .collect::<Vec<_>>()
                .join(", "),
            Inline::Emphasis(mark)
            | Inline::Strong(mark)
            | Inline::Delete(mark)
            | Inline::Superscript(mark)
            | Inline::Subscript(mark) => mark.content.to_text(),
            Inline::Link(link) => link.content.to_text(),
            Inline::Cite(cite) => {
                if cite.content.is_empty() {
                    cite.target.clone()
                } else {
                    cite.content.to_text()
                }
            }
            Inline::Quote(quote) => quote.content.to_text(),
            Inline::CodeFragment(code) => code.text.clone(),
            Inline::CodeExpression(expr) => match &expr.output {
                Some(output) => output.to_text(),
                None => expr.text.clone(),
            },
            Inline::ImageObject(image) => image.caption.clone().unwrap_or_default(),
            Inline::MediaObject(_) => String::new(),
            Inline::MathFragment(math) => math.text.clone(),
        }
    }
}

impl ToText for Block {
    fn to_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.content.to_text(),
            Block::Heading(h) => h.content.to_text(),
            Block::List(list) => list
                .items
                .iter()
                .map(|item| blocks_text(&item.content))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table(table) => table
                .rows
                .iter()
                .map(|row| {
                    row.cells
                        .iter()
                        .map(|cell| cell.content.to_text())
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Block::CodeBlock(code) => code.text.clone(),
            Block::CodeChunk(chunk) => chunk.text.clone(),
            Block::QuoteBlock(quote) => blocks_text(&quote.content),
            Block::Figure(figure) => {
                let mut parts = vec![nodes_text(&figure.content), blocks_text(&figure.caption)];
                parts.retain(|part| !part.is_empty());
                parts.join("\n\n")
            }
            Block::ThematicBreak(_) => String::new(),
            Block::MathBlock(math) => math.text.clone(),
            Block::Collection(collection) => nodes_text(&collection.parts),
            Block::Include(include) => blocks_text(&include.content),
        }
    }
}

impl ToText for Node {
    fn to_text(&self) -> String {
        match self {
            Node::Article(article) => {
                let mut parts = Vec::new();
                if let Some(title) = &article.title {
                    parts.push(title.to_text());
                }
                parts.push(blocks_text(&article.content));
                parts.retain(|part| !part.is_empty());
                parts.join("\n\n")
            }
            Node::ListItem(item) => blocks_text(&item.content),
            Node::TableRow(row) => row
                .cells
                .iter()
                .map(|cell| cell.content.to_text())
                .collect::<Vec<_>>()
                .join("\t"),
            Node::TableCell(cell) => cell.content.to_text(),
            Node::Person(person) => person.display_name(),
            Node::Organization(org) => org.name.clone().unwrap_or_default(),
            Node::CreativeWork(work) => work.title.clone().unwrap_or_default(),
            other => match Block::try_from(other.clone()) {
                Ok(block) => block.to_text(),
                Err(err) => match Inline::try_from(err.into_node()) {
                    Ok(inline) => inline.to_text(),
                    Err(_) => String::new(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_flatten_to_their_text() {
        let para = Block::Paragraph(Paragraph::new(vec![
            Inline::from("a "),
            Inline::Strong(Mark::new(vec![Inline::from("b")])),
            Inline::MathFragment(Math::tex(" c")),
        ]));
        assert_eq!(para.to_text(), "a b c");
    }

    #[test]
    fn article_joins_title_and_blocks() {
        let article = Node::Article(
            Article::new(vec![
                Block::Paragraph(Paragraph::new(vec![Inline::from("one")])),
                Block::ThematicBreak(ThematicBreak::default()),
                Block::Paragraph(Paragraph::new(vec![Inline::from("two")])),
            ])
            .with_title(vec![Inline::from("Title")]),
        );
        assert_eq!(article.to_text(), "Title\n\none\n\ntwo");
    }

    #[test]
    fn primitives_render_as_values() {
        assert_eq!(Node::Integer(42).to_text(), "42");
        assert_eq!(Node::Boolean(false).to_text(), "false");
        assert_eq!(Node::Number(1.5).to_text(), "1.5");
    }
}
