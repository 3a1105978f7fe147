//! Structs carried by node variants
//!
//! Split by role: [`article`] holds the top-level work and its metadata types, [`blocks`] the
//! block-level elements, [`inlines`] the inline elements. Field names follow the serialized
//! camelCase form; optional fields are `Option` and omitted when absent.

pub mod article;
pub mod blocks;
pub mod inlines;

pub use article::{Article, Author, CreativeWork, Organization, Person};
pub use blocks::{
    CodeBlock, CodeChunk, Collection, Figure, Heading, Include, List, ListItem, ListOrder, Math,
    Paragraph, QuoteBlock, Table, TableCell, TableCellType, TableRow, TableRowType, ThematicBreak,
};
pub use inlines::{
    Cite, CodeExpression, CodeFragment, ImageObject, Link, Mark, MediaObject, Quote,
};

/// Out-of-band `key=value` metadata attached to code, links and images
pub type Meta = std::collections::BTreeMap<String, String>;
