//! Read-only tree traversal
//!
//! Implement the hooks you care about; the `walk_*` functions recurse into children. A hook
//! that overrides the default and still wants children visited calls the matching `walk_*`.

use crate::content::{Block, Inline};
use crate::node::Node;

pub trait Visitor {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_inline(&mut self, inline: &Inline) {
        walk_inline(self, inline);
    }
}

pub fn walk_blocks<V: Visitor + ?Sized>(visitor: &mut V, blocks: &[Block]) {
    for block in blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_inlines<V: Visitor + ?Sized>(visitor: &mut V, inlines: &[Inline]) {
    for inline in inlines {
        visitor.visit_inline(inline);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    match block {
        Block::Paragraph(p) => walk_inlines(visitor, &p.content),
        Block::Heading(h) => walk_inlines(visitor, &h.content),
        Block::List(list) => {
            for item in &list.items {
                walk_blocks(visitor, &item.content);
            }
        }
        Block::Table(table) => {
            walk_blocks(visitor, &table.caption);
            for row in &table.rows {
                for cell in &row.cells {
                    walk_inlines(visitor, &cell.content);
                }
            }
        }
        Block::CodeChunk(chunk) => {
            for output in &chunk.outputs {
                walk_node(visitor, output);
            }
            walk_blocks(visitor, &chunk.caption);
        }
        Block::QuoteBlock(quote) => walk_blocks(visitor, &quote.content),
        Block::Figure(figure) => {
            for node in &figure.content {
                walk_node(visitor, node);
            }
            walk_blocks(visitor, &figure.caption);
        }
        Block::Collection(collection) => {
            for part in &collection.parts {
                walk_node(visitor, part);
            }
        }
        Block::Include(include) => walk_blocks(visitor, &include.content),
        Block::CodeBlock(_) | Block::ThematicBreak(_) | Block::MathBlock(_) => {}
    }
}

pub fn walk_inline<V: Visitor + ?Sized>(visitor: &mut V, inline: &Inline) {
    match inline {
        Inline::Emphasis(mark)
        | Inline::Strong(mark)
        | Inline::Delete(mark)
        | Inline::Superscript(mark)
        | Inline::Subscript(mark) => walk_inlines(visitor, &mark.content),
        Inline::Link(link) => walk_inlines(visitor, &link.content),
        Inline::Cite(cite) => walk_inlines(visitor, &cite.content),
        Inline::Quote(quote) => walk_inlines(visitor, &quote.content),
        Inline::CodeExpression(expr) => {
            if let Some(output) = &expr.output {
                walk_node(visitor, output);
            }
        }
        _ => {}
    }
}

/// Visit an untyped node, dispatching to the block or inline hook when it is one
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) {
    match node {
        Node::Article(article) => {
            if let Some(title) = &article.title {
                walk_inlines(visitor, title);
            }
            walk_blocks(visitor, &article.content);
        }
        Node::ListItem(item) => walk_blocks(visitor, &item.content),
        Node::TableRow(row) => {
            for cell in &row.cells {
                walk_inlines(visitor, &cell.content);
            }
        }
        Node::TableCell(cell) => walk_inlines(visitor, &cell.content),
        Node::Person(_) | Node::Organization(_) | Node::CreativeWork(_) => {}
        other => match Block::try_from(other.clone()) {
            Ok(block) => visitor.visit_block(&block),
            Err(err) => {
                if let Ok(inline) = Inline::try_from(err.into_node()) {
                    visitor.visit_inline(&inline);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::*;

    #[derive(Default)]
    struct CiteCollector {
        targets: Vec<String>,
    }

    impl Visitor for CiteCollector {
        fn visit_inline(&mut self, inline: &Inline) {
            if let Inline::Cite(cite) = inline {
                self.targets.push(cite.target.clone());
            }
            walk_inline(self, inline);
        }
    }

    #[test]
    fn finds_nested_citations() {
        let article = Node::Article(Article::new(vec![Block::List(List::new(
            ListOrder::Unordered,
            vec![ListItem::new(vec![Block::Paragraph(Paragraph::new(vec![
                Inline::Strong(Mark::new(vec![Inline::Cite(Cite {
                    target: "bib1".into(),
                    content: vec![],
                })])),
            ]))])],
        ))]));
        let mut collector = CiteCollector::default();
        walk_node(&mut collector, &article);
        assert_eq!(collector.targets, vec!["bib1"]);
    }
}
