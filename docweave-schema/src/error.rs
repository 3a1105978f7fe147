//! Errors raised when a node does not fit the content slot it is placed in

use crate::node::Node;
use thiserror::Error;

/// A node was used where the schema does not allow it.
///
/// The rejected node is handed back so callers can coerce it instead of losing it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("`{}` cannot be used as block content", .0.node_type())]
    NotBlock(Box<Node>),

    #[error("`{}` cannot be used as inline content", .0.node_type())]
    NotInline(Box<Node>),
}

impl ContentError {
    /// Recover the node that was rejected
    pub fn into_node(self) -> Node {
        match self {
            ContentError::NotBlock(node) | ContentError::NotInline(node) => *node,
        }
    }
}
