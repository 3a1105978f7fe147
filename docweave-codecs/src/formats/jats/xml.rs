//! Minimal XML element tree for writing JATS
//!
//! roxmltree only reads, so the encoder builds these and serializes them itself. Output is
//! compact: whitespace is never added between elements because mixed content is significant.

use html_escape::{encode_double_quoted_attribute, encode_text};

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    /// Pre-serialized markup, written through unchanged (MathML kept from decoding)
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.push((name.to_string(), value.into()));
    }

    /// Set the attribute only when a value is present
    pub fn opt_attr(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(XmlNode::Text(previous)) => previous.push_str(&text),
            _ => self.children.push(XmlNode::Text(text)),
        }
    }

    pub fn push_raw(&mut self, raw: impl Into<String>) {
        self.children.push(XmlNode::Raw(raw.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write(out),
                XmlNode::Text(text) => out.push_str(&encode_text(text)),
                XmlNode::Raw(raw) => out.push_str(raw),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let element = Element::new("p")
            .attr("title", "a \"b\" & c")
            .text("1 < 2 & 3");
        assert_eq!(
            element.to_xml(),
            "<p title=\"a &quot;b&quot; &amp; c\">1 &lt; 2 &amp; 3</p>"
        );
    }

    #[test]
    fn empty_elements_self_close() {
        assert_eq!(Element::new("hr").to_xml(), "<hr/>");
    }

    #[test]
    fn adjacent_text_merges() {
        let mut element = Element::new("p");
        element.push_text("a");
        element.push_text("b");
        assert_eq!(element.children, vec![XmlNode::Text("ab".into())]);
    }
}
