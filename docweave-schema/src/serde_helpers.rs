//! Lenient deserializers for fields that people write by hand
//!
//! Front matter often gives a title as a plain string and a description as a paragraph of text.
//! These accept a string, a single node, or an array of nodes and coerce to the field's type.

use crate::content::{coerce_blocks, coerce_inlines, Block, Inline};
use crate::node::Node;
use serde::{Deserialize, Deserializer};

fn into_nodes(node: Node) -> Vec<Node> {
    match node {
        Node::Null => Vec::new(),
        Node::Array(items) => items,
        other => vec![other],
    }
}

pub fn optional_inlines<'de, D>(deserializer: D) -> Result<Option<Vec<Inline>>, D::Error>
where
    D: Deserializer<'de>,
{
    let node = Option::<Node>::deserialize(deserializer)?;
    Ok(node.map(|node| coerce_inlines(into_nodes(node))))
}

pub fn optional_blocks<'de, D>(deserializer: D) -> Result<Option<Vec<Block>>, D::Error>
where
    D: Deserializer<'de>,
{
    let node = Option::<Node>::deserialize(deserializer)?;
    Ok(node.map(|node| coerce_blocks(into_nodes(node))))
}
