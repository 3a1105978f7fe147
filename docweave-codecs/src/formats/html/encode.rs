//! HTML encoding (Node → HTML)
//!
//! Pipeline: Node tree → RcDom → HTML string.
//!
//! Every element is built as an rcdom handle and serialized by html5ever, so escaping is never
//! done by hand.

use super::{itemtype, MICRODATA_BASE};
use crate::error::CodecError;
use crate::formats::as_article;
use docweave_schema::*;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node as DomNode, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Encode a node as an `<article>` element, or a complete document when `standalone`
pub fn encode_html(node: &Node, standalone: bool) -> Result<String, CodecError> {
    let article = as_article(node);
    let element = article_element(&article);
    let body = serialize_handle(&element)?;

    if !standalone {
        return Ok(body);
    }

    let title = article
        .title
        .as_ref()
        .map(|title| title.to_text())
        .unwrap_or_else(|| "Untitled".to_string());
    let head = create_element("head", vec![]);
    append(&head, create_element("meta", vec![("charset", "utf-8")]));
    append(
        &head,
        create_element(
            "meta",
            vec![
                ("name", "viewport"),
                ("content", "width=device-width, initial-scale=1.0"),
            ],
        ),
    );
    append(&head, create_element("meta", vec![("name", "generator"), ("content", "docweave")]));
    let title_element = create_element("title", vec![]);
    append(&title_element, create_text(&title));
    append(&head, title_element);

    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n{}\n<body>\n{}\n</body>\n</html>\n",
        serialize_handle(&head)?,
        body
    ))
}

fn article_element(article: &Article) -> Handle {
    let root = create_element(
        "article",
        vec![("itemscope", ""), ("itemtype", "https://schema.org/Article")],
    );
    if let Some(id) = &article.id {
        set_attr(&root, "id", id);
    }

    if let Some(title) = &article.title {
        let h1 = create_element("h1", vec![("itemprop", "headline")]);
        encode_inlines(&h1, title);
        append(&root, h1);
    }

    if !article.authors.is_empty() {
        let authors = create_element("ol", vec![("data-prop", "authors")]);
        for author in &article.authors {
            let (kind, name) = match author {
                Author::Person(person) => ("Person", person.display_name()),
                Author::Organization(org) => ("Organization", org.name.clone().unwrap_or_default()),
            };
            let item = create_element(
                "li",
                vec![
                    ("itemprop", "author"),
                    ("itemscope", ""),
                    ("itemtype", format!("https://schema.org/{kind}").as_str()),
                ],
            );
            let span = create_element("span", vec![("itemprop", "name")]);
            append(&span, create_text(&name));
            append(&item, span);
            append(&authors, item);
        }
        append(&root, authors);
    }

    if let Some(date) = &article.date_published {
        let time = create_element(
            "time",
            vec![("itemprop", "datePublished"), ("datetime", date.as_str())],
        );
        append(&time, create_text(date));
        append(&root, time);
    }

    if let Some(description) = &article.description {
        let section = create_element("section", vec![("data-prop", "description")]);
        encode_blocks(&section, description);
        append(&root, section);
    }

    encode_blocks(&root, &article.content);

    if !article.references.is_empty() {
        let section = create_element("section", vec![("data-prop", "references")]);
        let list = create_element("ol", vec![]);
        for work in &article.references {
            let item = create_element(
                "li",
                vec![("itemscope", ""), ("itemtype", "https://schema.org/CreativeWork")],
            );
            if let Some(id) = &work.id {
                set_attr(&item, "id", id);
            }
            append(&item, create_text(&reference_text(work)));
            append(&list, item);
        }
        append(&section, list);
        append(&root, section);
    }

    root
}

fn reference_text(work: &CreativeWork) -> String {
    let authors = work
        .authors
        .iter()
        .filter_map(Author::citation_name)
        .collect::<Vec<_>>()
        .join(", ");
    let mut parts = Vec::new();
    if !authors.is_empty() {
        parts.push(authors);
    }
    if let Some(year) = work.year() {
        parts.push(format!("({year})"));
    }
    if let Some(title) = &work.title {
        parts.push(title.clone());
    }
    if let Some(journal) = &work.is_part_of {
        parts.push(journal.clone());
    }
    parts.join(" ")
}

pub(super) fn encode_blocks(parent: &Handle, blocks: &[Block]) {
    for block in blocks {
        append(parent, encode_block(block));
    }
}

fn encode_block(block: &Block) -> Handle {
    match block {
        Block::Paragraph(p) => {
            let el = create_element("p", vec![]);
            set_id(&el, &p.id);
            encode_inlines(&el, &p.content);
            el
        }
        Block::Heading(h) => {
            let tag = format!("h{}", h.depth.clamp(1, 6));
            let el = create_element(&tag, vec![]);
            set_id(&el, &h.id);
            encode_inlines(&el, &h.content);
            el
        }
        Block::List(list) => {
            let el = match list.order {
                ListOrder::Unordered => create_element("ul", vec![]),
                ListOrder::Ascending => create_element("ol", vec![]),
                ListOrder::Descending => create_element("ol", vec![("reversed", "")]),
            };
            set_id(&el, &list.id);
            for item in &list.items {
                let li = create_element("li", vec![]);
                if let Some(checked) = item.is_checked {
                    let mut attrs = vec![("type", "checkbox"), ("disabled", "")];
                    if checked {
                        attrs.push(("checked", ""));
                    }
                    append(&li, create_element("input", attrs));
                }
                // Tight items: a lone paragraph is written without its <p>
                match item.content.as_slice() {
                    [Block::Paragraph(p)] => encode_inlines(&li, &p.content),
                    blocks => encode_blocks(&li, blocks),
                }
                append(&el, li);
            }
            el
        }
        Block::Table(table) => encode_table(table),
        Block::CodeBlock(code) => {
            let pre = create_element("pre", vec![]);
            set_id(&pre, &code.id);
            append(&pre, code_element(&code.text, code.programming_language.as_deref()));
            pre
        }
        Block::CodeChunk(chunk) => {
            let figure = create_element("figure", vec![("class", "code-chunk")]);
            set_id(&figure, &chunk.id);
            if let Some(label) = &chunk.label {
                set_attr(&figure, "data-label", label);
            }
            let pre = create_element("pre", vec![("class", "source")]);
            append(
                &pre,
                code_element(&chunk.text, chunk.programming_language.as_deref()),
            );
            append(&figure, pre);
            let outputs = create_element("div", vec![("class", "outputs")]);
            for output in &chunk.outputs {
                append(&outputs, encode_node(output));
            }
            append(&figure, outputs);
            if !chunk.caption.is_empty() {
                let caption = create_element("figcaption", vec![]);
                encode_blocks(&caption, &chunk.caption);
                append(&figure, caption);
            }
            figure
        }
        Block::QuoteBlock(quote) => {
            let el = create_element("blockquote", vec![]);
            if let Some(cite) = &quote.cite {
                set_attr(&el, "cite", cite);
            }
            encode_blocks(&el, &quote.content);
            el
        }
        Block::Figure(figure) => {
            let el = create_element("figure", vec![]);
            set_id(&el, &figure.id);
            if let Some(label) = &figure.label {
                set_attr(&el, "data-label", label);
            }
            for node in &figure.content {
                append(&el, encode_node(node));
            }
            if !figure.caption.is_empty() {
                let caption = create_element("figcaption", vec![]);
                encode_blocks(&caption, &figure.caption);
                append(&el, caption);
            }
            el
        }
        Block::ThematicBreak(_) => create_element("hr", vec![]),
        Block::MathBlock(math) => math_element("div", "math-block", math),
        Block::Collection(collection) => {
            let el = create_element("div", vec![("class", "collection")]);
            set_id(&el, &collection.id);
            for part in &collection.parts {
                append(&el, encode_node(part));
            }
            el
        }
        Block::Include(include) => {
            let el = create_element(
                "div",
                vec![("class", "include"), ("data-source", include.source.as_str())],
            );
            if let Some(media_type) = &include.media_type {
                set_attr(&el, "data-media-type", media_type);
            }
            encode_blocks(&el, &include.content);
            el
        }
    }
}

fn encode_table(table: &Table) -> Handle {
    let el = create_element("table", vec![]);
    set_id(&el, &table.id);
    if let Some(label) = &table.label {
        set_attr(&el, "data-label", label);
    }
    if !table.caption.is_empty() {
        let caption = create_element("caption", vec![]);
        encode_blocks(&caption, &table.caption);
        append(&el, caption);
    }

    let head = create_element("thead", vec![]);
    let body = create_element("tbody", vec![]);
    let foot = create_element("tfoot", vec![]);
    for row in &table.rows {
        let tr = create_element("tr", vec![]);
        for cell in &row.cells {
            let is_header = cell.cell_type == Some(TableCellType::Header)
                || (cell.cell_type.is_none() && row.is_header());
            let td = create_element(if is_header { "th" } else { "td" }, vec![]);
            if let Some(span) = cell.column_span.filter(|span| *span > 1) {
                set_attr(&td, "colspan", &span.to_string());
            }
            if let Some(span) = cell.row_span.filter(|span| *span > 1) {
                set_attr(&td, "rowspan", &span.to_string());
            }
            encode_inlines(&td, &cell.content);
            append(&tr, td);
        }
        match row.row_type {
            Some(TableRowType::Header) => append(&head, tr),
            Some(TableRowType::Footer) => append(&foot, tr),
            None => append(&body, tr),
        }
    }
    for section in [head, body, foot] {
        if !section.children.borrow().is_empty() {
            append(&el, section);
        }
    }
    el
}

pub(super) fn encode_inlines(parent: &Handle, inlines: &[Inline]) {
    for inline in inlines {
        append(parent, encode_inline(inline));
    }
}

fn encode_inline(inline: &Inline) -> Handle {
    match inline {
        Inline::String(text) => create_text(text),
        Inline::Null => data_element("Null", "null", "null"),
        Inline::Boolean(value) => {
            let text = value.to_string();
            data_element("Boolean", &text, &text)
        }
        Inline::Integer(value) => {
            let text = value.to_string();
            data_element("Integer", &text, &text)
        }
        Inline::Number(value) => {
            let json = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
            data_element("Number", &json, &value.to_string())
        }
        Inline::Array(items) => {
            let json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
            data_element("Array", &json, &json)
        }
        Inline::Object(object) => {
            let json = serde_json::to_string(object).unwrap_or_else(|_| "{}".to_string());
            data_element("Object", &json, &json)
        }
        Inline::Emphasis(mark) => mark_element("em", mark),
        Inline::Strong(mark) => mark_element("strong", mark),
        Inline::Delete(mark) => mark_element("del", mark),
        Inline::Superscript(mark) => mark_element("sup", mark),
        Inline::Subscript(mark) => mark_element("sub", mark),
        Inline::Link(link) => {
            let a = create_element("a", vec![("href", link.target.as_str())]);
            if let Some(title) = &link.title {
                set_attr(&a, "title", title);
            }
            if let Some(rel) = &link.rel {
                set_attr(&a, "rel", rel);
            }
            set_id(&a, &link.id);
            encode_inlines(&a, &link.content);
            a
        }
        Inline::Cite(cite) => {
            let el = create_element("cite", vec![]);
            let a = create_element("a", vec![("href", format!("#{}", cite.target).as_str())]);
            if cite.content.is_empty() {
                append(&a, create_text(&cite.target));
            } else {
                encode_inlines(&a, &cite.content);
            }
            append(&el, a);
            el
        }
        Inline::Quote(quote) => {
            let q = create_element("q", vec![]);
            if let Some(cite) = &quote.cite {
                set_attr(&q, "cite", cite);
            }
            encode_inlines(&q, &quote.content);
            q
        }
        Inline::CodeFragment(code) => {
            code_element(&code.text, code.programming_language.as_deref())
        }
        Inline::CodeExpression(expr) => {
            let span = create_element("span", vec![("class", "code-expression")]);
            if let Some(lang) = &expr.programming_language {
                set_attr(&span, "data-programming-language", lang);
            }
            let code = create_element("code", vec![]);
            append(&code, create_text(&expr.text));
            append(&span, code);
            let output = create_element("output", vec![]);
            if let Some(value) = &expr.output {
                append(&output, encode_node(value));
            }
            append(&span, output);
            span
        }
        Inline::ImageObject(image) => {
            let img = create_element("img", vec![("src", image.content_url.as_str())]);
            if let Some(alt) = &image.caption {
                set_attr(&img, "alt", alt);
            }
            if let Some(title) = &image.title {
                set_attr(&img, "title", title);
            }
            set_id(&img, &image.id);
            img
        }
        Inline::MediaObject(media) => {
            let tag = match media.media_type.as_deref() {
                Some(media_type) if media_type.starts_with("audio/") => "audio",
                _ => "video",
            };
            let el = create_element(tag, vec![("src", media.content_url.as_str()), ("controls", "")]);
            set_id(&el, &media.id);
            el
        }
        Inline::MathFragment(math) => math_element("span", "math-fragment", math),
    }
}

/// Encode a node that may be either a block or an inline
fn encode_node(node: &Node) -> Handle {
    match Block::try_from(node.clone()) {
        Ok(block) => encode_block(&block),
        Err(err) => match Inline::try_from(err.into_node()) {
            Ok(inline) => encode_inline(&inline),
            Err(err) => create_text(&err.into_node().to_text()),
        },
    }
}

fn mark_element(tag: &str, mark: &Mark) -> Handle {
    let el = create_element(tag, vec![]);
    encode_inlines(&el, &mark.content);
    el
}

fn code_element(text: &str, language: Option<&str>) -> Handle {
    let class = language.map(|lang| format!("language-{lang}"));
    let attrs = match &class {
        Some(class) => vec![("class", class.as_str())],
        None => vec![],
    };
    let code = create_element("code", attrs);
    append(&code, create_text(text));
    code
}

fn math_element(tag: &str, class: &str, math: &Math) -> Handle {
    let language = math.math_language.as_deref().unwrap_or("tex");
    let el = create_element(tag, vec![("class", class), ("data-math-language", language)]);
    set_id(&el, &math.id);
    append(&el, create_text(&math.text));
    el
}

fn data_element(type_name: &str, value: &str, text: &str) -> Handle {
    let el = create_element(
        "data",
        vec![("itemtype", itemtype(type_name).as_str()), ("value", value)],
    );
    append(&el, create_text(text));
    el
}

fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

fn set_id(el: &Handle, id: &Option<String>) {
    if let Some(id) = id {
        set_attr(el, "id", id);
    }
}

fn set_attr(el: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &el.data {
        attrs.borrow_mut().push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        });
    }
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

fn serialize_handle(handle: &Handle) -> Result<String, CodecError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    serialize(&mut output, &SerializableHandle::from(handle.clone()), opts)?;
    String::from_utf8(output).map_err(|err| CodecError::malformed("html", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(inlines: Vec<Inline>) -> Node {
        Node::Paragraph(Paragraph::new(inlines))
    }

    #[test]
    fn fragment_has_no_document_wrapper() {
        let html = encode_html(&paragraph(vec![Inline::from("Hi")]), false).unwrap();
        assert!(!html.contains("<!DOCTYPE"));
        assert!(html.contains("<p>Hi</p>"));
    }

    #[test]
    fn standalone_has_title() {
        let article = Node::Article(Article::new(vec![]).with_title(vec![Inline::from("Doc")]));
        let html = encode_html(&article, true).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Doc</title>"));
    }

    #[test]
    fn text_is_escaped() {
        let html = encode_html(&paragraph(vec![Inline::from("a < b & c")]), false).unwrap();
        assert!(html.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn primitives_use_data_elements() {
        let html = encode_html(&paragraph(vec![Inline::Boolean(true)]), false).unwrap();
        assert!(html.contains(&format!(
            "<data itemtype=\"{MICRODATA_BASE}Boolean\" value=\"true\">true</data>"
        )));
    }

    #[test]
    fn math_carries_its_language() {
        let html = encode_html(&paragraph(vec![Inline::MathFragment(Math::tex("x^2"))]), false)
            .unwrap();
        assert!(html.contains(
            "<span class=\"math-fragment\" data-math-language=\"tex\">x^2</span>"
        ));
    }
}
