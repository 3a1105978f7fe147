//! Heading hierarchy for flat → nested conversion
//!
//! The node tree keeps headings flat, in reading order, while JATS nests content in `<sec>`
//! elements. Encoding needs to know which sections are currently "open" and close parents when
//! a heading at the same or a shallower depth comes along:
//!
//! ```text
//! # Chapter 1            <sec><title>Chapter 1</title>
//! Content                  <p>Content</p>
//! ## Section 1.1           <sec><title>Section 1.1</title>
//! More content               <p>More content</p>
//! # Chapter 2            </sec></sec><sec><title>Chapter 2</title>
//! ```
//!
//! [`SectionStack`] keeps the open sections with their depths; closing one appends it to its
//! parent.

use super::xml::Element;

#[derive(Debug)]
pub struct SectionStack {
    root: Element,
    /// Open sections, outermost first, with the heading depth that opened each
    stack: Vec<(u8, Element)>,
}

impl SectionStack {
    pub fn new(root: Element) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    /// Close sections at the same or a deeper level, then open `section`
    ///
    /// A skipped level still nests: depth 4 directly under depth 1 is one level down.
    pub fn on_heading(&mut self, depth: u8, section: Element) {
        while self
            .stack
            .last()
            .is_some_and(|(open_depth, _)| *open_depth >= depth)
        {
            self.close_one();
        }
        self.stack.push((depth, section));
    }

    /// The element that content currently goes into
    pub fn current(&mut self) -> &mut Element {
        match self.stack.last_mut() {
            Some((_, section)) => section,
            None => &mut self.root,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close every open section and return the root
    pub fn close_all(mut self) -> Element {
        while !self.stack.is_empty() {
            self.close_one();
        }
        self.root
    }

    fn close_one(&mut self) {
        if let Some((_, section)) = self.stack.pop() {
            self.current().push(section);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sec(title: &str) -> Element {
        Element::new("sec").child(Element::new("title").text(title))
    }

    #[test]
    fn single_heading() {
        let mut sections = SectionStack::new(Element::new("body"));
        sections.on_heading(1, sec("A"));
        assert_eq!(sections.depth(), 1);
        assert_eq!(
            sections.close_all().to_xml(),
            "<body><sec><title>A</title></sec></body>"
        );
    }

    #[test]
    fn same_level_closes_previous() {
        let mut sections = SectionStack::new(Element::new("body"));
        sections.on_heading(1, sec("A"));
        sections.on_heading(1, sec("B"));
        assert_eq!(sections.depth(), 1);
        assert_eq!(
            sections.close_all().to_xml(),
            "<body><sec><title>A</title></sec><sec><title>B</title></sec></body>"
        );
    }

    #[test]
    fn realistic_document() {
        let mut sections = SectionStack::new(Element::new("body"));
        sections.current().push(Element::new("p").text("preface"));
        sections.on_heading(1, sec("1"));
        sections.on_heading(2, sec("1.1"));
        sections.on_heading(3, sec("1.1.1"));
        sections.current().push(Element::new("p").text("deep"));
        sections.on_heading(2, sec("1.2"));
        assert_eq!(sections.depth(), 2);
        sections.on_heading(1, sec("2"));
        assert_eq!(
            sections.close_all().to_xml(),
            "<body><p>preface</p>\
             <sec><title>1</title>\
             <sec><title>1.1</title><sec><title>1.1.1</title><p>deep</p></sec></sec>\
             <sec><title>1.2</title></sec>\
             </sec>\
             <sec><title>2</title></sec></body>"
        );
    }

    #[test]
    fn skipped_level_still_nests() {
        let mut sections = SectionStack::new(Element::new("body"));
        sections.on_heading(1, sec("A"));
        sections.on_heading(4, sec("B"));
        assert_eq!(sections.depth(), 2);
        sections.on_heading(2, sec("C"));
        assert_eq!(sections.depth(), 2);
    }
}
