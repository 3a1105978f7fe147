//! The universal node type
//!
//! `Node` is flat: primitives and every entity type are direct variants, so codecs can match on
//! `Node::Paragraph(..)` without unwrapping layers. Serde goes through a private representation
//! (`NodeRepr`) that is untagged for primitives and internally tagged on `type` for entities.

use crate::elements::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A plain object of named nodes
pub type Object = BTreeMap<String, Node>;

macro_rules! node_entities {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Any value that can appear in a document tree
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(from = "NodeRepr", into = "NodeRepr")]
        pub enum Node {
            Null,
            Boolean(bool),
            Integer(i64),
            Number(f64),
            String(String),
            Array(Vec<Node>),
            Object(Object),
            $($variant($ty),)*
        }

        #[derive(Serialize, Deserialize)]
        #[serde(tag = "type")]
        enum Entity {
            $($variant($ty),)*
        }

        impl Node {
            /// The discriminant used for dispatch and as the serialized `type`
            pub fn node_type(&self) -> &'static str {
                match self {
                    Node::Null => "Null",
                    Node::Boolean(_) => "Boolean",
                    Node::Integer(_) => "Integer",
                    Node::Number(_) => "Number",
                    Node::String(_) => "String",
                    Node::Array(_) => "Array",
                    Node::Object(_) => "Object",
                    $(Node::$variant(_) => stringify!($variant),)*
                }
            }
        }

        impl From<NodeRepr> for Node {
            fn from(repr: NodeRepr) -> Self {
                match repr {
                    NodeRepr::Null(()) => Node::Null,
                    NodeRepr::Boolean(value) => Node::Boolean(value),
                    NodeRepr::Integer(value) => Node::Integer(value),
                    NodeRepr::Number(value) => Node::Number(value),
                    NodeRepr::String(value) => Node::String(value),
                    NodeRepr::Array(items) => Node::Array(items),
                    NodeRepr::Object(object) => Node::Object(object),
                    NodeRepr::Entity(entity) => match entity {
                        $(Entity::$variant(value) => Node::$variant(value),)*
                    },
                }
            }
        }

        impl From<Node> for NodeRepr {
            fn from(node: Node) -> Self {
                match node {
                    Node::Null => NodeRepr::Null(()),
                    Node::Boolean(value) => NodeRepr::Boolean(value),
                    Node::Integer(value) => NodeRepr::Integer(value),
                    Node::Number(value) => NodeRepr::Number(value),
                    Node::String(value) => NodeRepr::String(value),
                    Node::Array(items) => NodeRepr::Array(items),
                    Node::Object(object) => NodeRepr::Object(object),
                    $(Node::$variant(value) => NodeRepr::Entity(Entity::$variant(value)),)*
                }
            }
        }
    };
}

node_entities! {
    Article(Article),
    Collection(Collection),
    CreativeWork(CreativeWork),
    Person(Person),
    Organization(Organization),
    Paragraph(Paragraph),
    Heading(Heading),
    List(List),
    ListItem(ListItem),
    Table(Table),
    TableRow(TableRow),
    TableCell(TableCell),
    CodeBlock(CodeBlock),
    CodeChunk(CodeChunk),
    QuoteBlock(QuoteBlock),
    Figure(Figure),
    ThematicBreak(ThematicBreak),
    MathBlock(Math),
    Include(Include),
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

// Order matters: serde tries untagged variants top to bottom, so integers must be tried before
// floats and tagged entities before plain objects.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum NodeRepr {
    Null(()),
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<Node>),
    Entity(Entity),
    Object(Object),
}

impl Node {
    /// Whether this node is a primitive value rather than a document entity
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Node::Null
                | Node::Boolean(_)
                | Node::Integer(_)
                | Node::Number(_)
                | Node::String(_)
                | Node::Array(_)
                | Node::Object(_)
        )
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::String(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::String(text)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Boolean(value)
    }
}

impl From<Article> for Node {
    fn from(article: Article) -> Self {
        Node::Article(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Inline;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn primitives_serialize_as_themselves() {
        let node = Node::Array(vec![
            Node::Null,
            Node::Boolean(true),
            Node::Integer(3),
            Node::Number(1.5),
            Node::from("text"),
        ]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!([null, true, 3, 1.5, "text"]));
    }

    #[test]
    fn entities_carry_a_type_tag() {
        let node = Node::Paragraph(Paragraph::new(vec![
            Inline::from("Some "),
            Inline::Emphasis(Mark::new(vec![Inline::from("text")])),
        ]));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Paragraph",
                "content": ["Some ", {"type": "Emphasis", "content": ["text"]}]
            })
        );
    }

    #[test]
    fn untyped_maps_decode_as_objects() {
        let node: Node = serde_json::from_value(json!({"a": 1, "b": [true]})).unwrap();
        let mut expected = Object::new();
        expected.insert("a".to_string(), Node::Integer(1));
        expected.insert("b".to_string(), Node::Array(vec![Node::Boolean(true)]));
        assert_eq!(node, Node::Object(expected));
    }

    #[test]
    fn floats_do_not_decode_as_integers() {
        let node: Node = serde_json::from_value(json!(2.0)).unwrap();
        assert_eq!(node, Node::Number(2.0));
    }

    #[test]
    fn node_type_names_variant() {
        assert_eq!(Node::MathFragment(Math::tex("x")).node_type(), "MathFragment");
        assert_eq!(Node::Null.node_type(), "Null");
    }
}
