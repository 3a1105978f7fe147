//! Canonical document model for docweave
//!
//!     Every codec converts between its own foreign tree (a markdown AST, an XML DOM, a notebook
//!     cell list) and the types defined here. Nothing in this crate knows about any external
//!     format: it is the common ground all formats meet on.
//!
//! Structure
//!
//!     - [`Node`]: the universal tagged union. Anything that can appear in a document, including
//!       raw primitives (null, booleans, numbers, arrays, objects) which some formats can embed
//!       directly as data.
//!     - [`Block`] and [`Inline`]: typed views over `Node` that restrict what a container may
//!       hold. A paragraph holds inlines, an article body holds blocks, never a mix. Converting a
//!       `Node` into one of them is fallible (`TryFrom`), converting back is not (`From`).
//!     - [`elements`]: the structs carried by each node variant.
//!     - [`content`]: coercion helpers that turn an arbitrary node sequence into valid block or
//!       inline content (wrapping inline runs in paragraphs, flattening blocks to inlines).
//!     - [`text`] and [`visit`]: plain text extraction and tree walking shared by codecs.
//!
//! Serialization
//!
//!     Nodes serialize with serde to the JSON shape used by the json and yaml codecs: entities
//!     carry a `type` discriminant and camelCase fields, absent optional fields and empty child
//!     lists are omitted, primitives serialize as themselves.
//!
//! Ownership
//!
//!     The tree is a plain value tree without parent links. Cross references (a citation's target,
//!     an affiliation id) are plain strings resolved by lookup.

pub mod content;
pub mod elements;
pub mod error;
pub mod node;
mod serde_helpers;
pub mod text;
pub mod visit;

pub use content::{coerce_blocks, coerce_inlines, merge_strings, Block, Inline};
pub use elements::*;
pub use error::ContentError;
pub use node::{Node, Object};
pub use text::ToText;
pub use visit::Visitor;
