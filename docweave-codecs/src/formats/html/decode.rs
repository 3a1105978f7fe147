//! HTML decoding (HTML → Node)
//!
//! html5ever parses the input into an RcDom, which is then walked top-down. Each element either
//! maps to a node, is skipped entirely (`script`, `style`, `head`), or is transparent and
//! contributes its children.

use super::MICRODATA_BASE;
use docweave_schema::*;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Elements that are dropped with their content
const SKIPPED: &[&str] = &["head", "script", "style", "template", "noscript", "title", "input"];

/// Elements that are replaced by their children without comment
const TRANSPARENT: &[&str] = &[
    "html", "body", "main", "article", "section", "header", "footer", "nav", "aside", "div",
    "span", "thead", "tbody", "tfoot", "small", "mark", "abbr", "time", "label", "font",
];

fn parse(html: &str) -> Handle {
    parse_document(RcDom::default(), Default::default())
        .one(html)
        .document
}

/// Decode a complete HTML document into an article
pub(super) fn decode_document(html: &str) -> Article {
    let document = parse(html);

    if let Some(root) = find(&document, &|handle| {
        tag(handle).as_deref() == Some("article")
            && attr(handle, "itemtype")
                .map_or(false, |itemtype| itemtype == format!("{MICRODATA_BASE}Article"))
    }) {
        return decode_article(&root);
    }

    let mut article = match find(&document, &|handle| tag(handle).as_deref() == Some("body")) {
        Some(body) => Article::new(blocks(decode_children(&body))),
        None => Article::default(),
    };
    article.title = find(&document, &|handle| tag(handle).as_deref() == Some("title"))
        .map(|title| collapse_whitespace(&text_content(&title)).trim().to_string())
        .filter(|title| !title.is_empty())
        .map(|title| vec![Inline::String(title)]);
    article
}

/// Decode a fragment of HTML, such as raw HTML embedded in markdown
///
/// Markup that has no counterpart in the node model (an empty `<div>`, a lone closing tag)
/// yields no nodes.
pub fn decode_fragment(html: &str) -> Vec<Node> {
    let document = parse(html);
    let Some(body) = find(&document, &|handle| tag(handle).as_deref() == Some("body")) else {
        return Vec::new();
    };
    let mut nodes = decode_children(&body);
    while matches!(nodes.first(), Some(Node::String(text)) if text.trim().is_empty()) {
        nodes.remove(0);
    }
    while matches!(nodes.last(), Some(Node::String(text)) if text.trim().is_empty()) {
        nodes.pop();
    }
    nodes
}

fn decode_article(root: &Handle) -> Article {
    let mut article = Article {
        id: attr(root, "id"),
        ..Default::default()
    };
    let mut body = Vec::new();

    for child in root.children.borrow().iter() {
        let name = tag(child);
        match name.as_deref() {
            Some("h1") if attr(child, "itemprop").as_deref() == Some("headline") => {
                article.title = Some(inlines(decode_children(child)));
            }
            Some("ol") if attr(child, "data-prop").as_deref() == Some("authors") => {
                article.authors = elements(child, "li").iter().map(decode_author).collect();
            }
            Some("time") if attr(child, "itemprop").as_deref() == Some("datePublished") => {
                article.date_published =
                    attr(child, "datetime").or_else(|| Some(text_content(child)));
            }
            Some("section") if attr(child, "data-prop").as_deref() == Some("description") => {
                article.description = Some(blocks(decode_children(child)));
            }
            Some("section") if attr(child, "data-prop").as_deref() == Some("references") => {
                article.references = descendants(child, "li")
                    .iter()
                    .map(|item| CreativeWork {
                        id: attr(item, "id"),
                        title: Some(collapse_whitespace(&text_content(item)).trim().to_string()),
                        ..Default::default()
                    })
                    .collect();
            }
            _ => decode_node(child, &mut body),
        }
    }

    article.content = blocks(body);
    article
}

fn decode_author(item: &Handle) -> Author {
    let name = descendants(item, "span")
        .into_iter()
        .find(|span| attr(span, "itemprop").as_deref() == Some("name"))
        .map(|span| text_content(&span))
        .unwrap_or_else(|| text_content(item));
    let name = collapse_whitespace(&name).trim().to_string();
    match attr(item, "itemtype") {
        Some(itemtype) if itemtype.ends_with("Organization") => Author::Organization(Organization {
            name: Some(name),
            ..Default::default()
        }),
        _ => Author::Person(Person::from_name(&name)),
    }
}

fn decode_children(handle: &Handle) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in handle.children.borrow().iter() {
        decode_node(child, &mut nodes);
    }
    nodes
}

fn decode_node(handle: &Handle, out: &mut Vec<Node>) {
    let name = match &handle.data {
        NodeData::Text { contents } => {
            out.push(Node::String(collapse_whitespace(&contents.borrow())));
            return;
        }
        NodeData::Element { name, .. } => name.local.to_string(),
        NodeData::Document => {
            out.extend(decode_children(handle));
            return;
        }
        _ => return,
    };

    let node = match name.as_str() {
        "p" => Node::Paragraph(Paragraph {
            id: attr(handle, "id"),
            content: inlines(decode_children(handle)),
        }),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Node::Heading(Heading {
            id: attr(handle, "id"),
            depth: name[1..].parse().unwrap_or(1),
            content: inlines(decode_children(handle)),
        }),
        "ul" | "ol" => Node::List(decode_list(handle, &name)),
        "table" => Node::Table(decode_table(handle)),
        "pre" => Node::CodeBlock(decode_pre(handle)),
        "figure" if has_class(handle, "code-chunk") => Node::CodeChunk(decode_chunk(handle)),
        "figure" => Node::Figure(decode_figure(handle)),
        "blockquote" => Node::QuoteBlock(QuoteBlock {
            cite: attr(handle, "cite"),
            content: blocks(decode_children(handle)),
        }),
        "hr" => Node::ThematicBreak(ThematicBreak::default()),
        "div" if has_class(handle, "math-block") => Node::MathBlock(decode_math(handle)),
        "div" if has_class(handle, "collection") => Node::Collection(Collection {
            id: attr(handle, "id"),
            parts: significant(decode_children(handle)),
        }),
        "div" if has_class(handle, "include") => Node::Include(Include {
            source: attr(handle, "data-source").unwrap_or_default(),
            media_type: attr(handle, "data-media-type"),
            content: blocks(decode_children(handle)),
        }),
        "span" if has_class(handle, "math-fragment") => Node::MathFragment(decode_math(handle)),
        "span" if has_class(handle, "code-expression") => {
            Node::CodeExpression(decode_expression(handle))
        }
        "data" => decode_data(handle),
        "em" | "i" => Node::Emphasis(mark(handle)),
        "strong" | "b" => Node::Strong(mark(handle)),
        "del" | "s" | "strike" => Node::Delete(mark(handle)),
        "sup" => Node::Superscript(mark(handle)),
        "sub" => Node::Subscript(mark(handle)),
        "a" => Node::Link(Link {
            id: attr(handle, "id"),
            target: attr(handle, "href").unwrap_or_default(),
            title: attr(handle, "title"),
            rel: attr(handle, "rel"),
            content: coerce_inlines(decode_children(handle)),
            meta: Meta::new(),
        }),
        "cite" => match decode_cite(handle) {
            Some(cite) => Node::Cite(cite),
            None => {
                out.extend(decode_children(handle));
                return;
            }
        },
        "q" => Node::Quote(Quote {
            cite: attr(handle, "cite"),
            content: coerce_inlines(decode_children(handle)),
        }),
        "code" => Node::CodeFragment(CodeFragment {
            text: text_content(handle),
            programming_language: language_class(handle),
            meta: Meta::new(),
        }),
        "img" => Node::ImageObject(ImageObject {
            id: attr(handle, "id"),
            caption: attr(handle, "alt").filter(|alt| !alt.is_empty()),
            title: attr(handle, "title"),
            ..ImageObject::new(attr(handle, "src").unwrap_or_default())
        }),
        "video" | "audio" => Node::MediaObject(MediaObject {
            id: attr(handle, "id"),
            content_url: attr(handle, "src")
                .or_else(|| elements(handle, "source").first().and_then(|s| attr(s, "src")))
                .unwrap_or_default(),
            media_type: None,
        }),
        "br" => Node::String(" ".to_string()),
        skipped if SKIPPED.contains(&skipped) => return,
        transparent if TRANSPARENT.contains(&transparent) => {
            out.extend(decode_children(handle));
            return;
        }
        unknown => {
            tracing::warn!(
                target: "docweave::decode",
                element = unknown,
                "unrecognized HTML element, keeping its content"
            );
            out.extend(decode_children(handle));
            return;
        }
    };
    out.push(node);
}

fn decode_list(handle: &Handle, name: &str) -> List {
    let order = match name {
        "ol" if attr(handle, "reversed").is_some() => ListOrder::Descending,
        "ol" => ListOrder::Ascending,
        _ => ListOrder::Unordered,
    };
    let items = elements(handle, "li")
        .iter()
        .map(|li| {
            let is_checked = elements(li, "input")
                .into_iter()
                .find(|input| attr(input, "type").as_deref() == Some("checkbox"))
                .map(|input| attr(&input, "checked").is_some());
            ListItem {
                id: attr(li, "id"),
                content: blocks(decode_children(li)),
                is_checked,
            }
        })
        .collect();
    List {
        id: attr(handle, "id"),
        order,
        items,
    }
}

fn decode_table(handle: &Handle) -> Table {
    let mut table = Table {
        id: attr(handle, "id"),
        label: attr(handle, "data-label"),
        ..Default::default()
    };
    for child in handle.children.borrow().iter() {
        match tag(child).as_deref() {
            Some("caption") => table.caption = blocks(decode_children(child)),
            Some("thead") => table.rows.extend(decode_rows(child, Some(TableRowType::Header))),
            Some("tfoot") => table.rows.extend(decode_rows(child, Some(TableRowType::Footer))),
            Some("tbody") => table.rows.extend(decode_rows(child, None)),
            Some("tr") => table.rows.push(decode_row(child, None)),
            _ => {}
        }
    }
    table
}

fn decode_rows(section: &Handle, row_type: Option<TableRowType>) -> Vec<TableRow> {
    elements(section, "tr")
        .iter()
        .map(|tr| decode_row(tr, row_type))
        .collect()
}

fn decode_row(tr: &Handle, row_type: Option<TableRowType>) -> TableRow {
    let in_header = row_type == Some(TableRowType::Header);
    let cells = tr
        .children
        .borrow()
        .iter()
        .filter_map(|cell| {
            let cell_type = match tag(cell).as_deref() {
                Some("th") if in_header => None,
                Some("th") => Some(TableCellType::Header),
                Some("td") if in_header => Some(TableCellType::Data),
                Some("td") => None,
                _ => return None,
            };
            Some(TableCell {
                content: inlines(decode_children(cell)),
                cell_type,
                column_span: attr(cell, "colspan").and_then(|span| span.parse().ok()),
                row_span: attr(cell, "rowspan").and_then(|span| span.parse().ok()),
            })
        })
        .collect();
    TableRow { cells, row_type }
}

fn decode_pre(handle: &Handle) -> CodeBlock {
    let code = elements(handle, "code").into_iter().next();
    CodeBlock {
        id: attr(handle, "id"),
        text: text_content(handle),
        programming_language: code.as_ref().and_then(language_class),
        meta: Meta::new(),
    }
}

fn decode_chunk(handle: &Handle) -> CodeChunk {
    let mut chunk = CodeChunk {
        id: attr(handle, "id"),
        label: attr(handle, "data-label"),
        ..Default::default()
    };
    for child in handle.children.borrow().iter() {
        match tag(child).as_deref() {
            Some("pre") => {
                let source = decode_pre(child);
                chunk.text = source.text;
                chunk.programming_language = source.programming_language;
            }
            Some("div") if has_class(child, "outputs") => {
                chunk.outputs = significant(decode_children(child));
            }
            Some("figcaption") => chunk.caption = blocks(decode_children(child)),
            _ => {}
        }
    }
    chunk
}

fn decode_figure(handle: &Handle) -> Figure {
    let mut figure = Figure {
        id: attr(handle, "id"),
        label: attr(handle, "data-label"),
        ..Default::default()
    };
    let mut content = Vec::new();
    for child in handle.children.borrow().iter() {
        if tag(child).as_deref() == Some("figcaption") {
            figure.caption = blocks(decode_children(child));
        } else {
            decode_node(child, &mut content);
        }
    }
    figure.content = significant(content);
    figure
}

fn decode_math(handle: &Handle) -> Math {
    Math {
        id: attr(handle, "id"),
        text: text_content(handle),
        math_language: attr(handle, "data-math-language").or_else(|| Some("tex".to_string())),
    }
}

fn decode_expression(handle: &Handle) -> CodeExpression {
    let text = elements(handle, "code")
        .first()
        .map(text_content)
        .unwrap_or_default();
    let output = elements(handle, "output")
        .first()
        .and_then(|output| significant(decode_children(output)).into_iter().next())
        .map(Box::new);
    CodeExpression {
        text,
        programming_language: attr(handle, "data-programming-language"),
        output,
    }
}

/// `<data>` carries a primitive as JSON in its `value` attribute
fn decode_data(handle: &Handle) -> Node {
    let value = attr(handle, "value");
    let typed = attr(handle, "itemtype")
        .map(|itemtype| itemtype.starts_with(MICRODATA_BASE))
        .unwrap_or(false);
    match value {
        Some(value) if typed => serde_json::from_str::<Node>(&value)
            .ok()
            .filter(Node::is_primitive)
            .unwrap_or(Node::String(value)),
        Some(value) => Node::String(value),
        None => Node::String(text_content(handle)),
    }
}

fn decode_cite(handle: &Handle) -> Option<Cite> {
    let anchors = elements(handle, "a");
    let [anchor] = anchors.as_slice() else {
        return None;
    };
    let target = attr(anchor, "href")?.strip_prefix('#')?.to_string();
    let content = coerce_inlines(decode_children(anchor));
    let content = match content.as_slice() {
        [Inline::String(text)] if *text == target => Vec::new(),
        _ => content,
    };
    Some(Cite { target, content })
}

fn mark(handle: &Handle) -> Mark {
    Mark::new(coerce_inlines(decode_children(handle)))
}

/// Block content, with paragraph edges trimmed
fn blocks(nodes: Vec<Node>) -> Vec<Block> {
    coerce_blocks(nodes)
        .into_iter()
        .filter_map(|block| match block {
            Block::Paragraph(mut p) => {
                p.content = trim_inlines(p.content);
                (!p.is_empty()).then_some(Block::Paragraph(p))
            }
            other => Some(other),
        })
        .collect()
}

fn inlines(nodes: Vec<Node>) -> Vec<Inline> {
    trim_inlines(coerce_inlines(nodes))
}

fn trim_inlines(mut inlines: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::String(first)) = inlines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Inline::String(last)) = inlines.last_mut() {
        *last = last.trim_end().to_string();
    }
    merge_strings(inlines)
}

/// Drop whitespace-only text between structural children
fn significant(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|node| !matches!(node, Node::String(text) if text.trim().is_empty()))
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }
    collapsed
}

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    collect_text(handle, &mut text);
    text
}

fn collect_text(handle: &Handle, text: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        text.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, text);
    }
}

fn tag(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

fn has_class(handle: &Handle, class: &str) -> bool {
    attr(handle, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

fn language_class(handle: &Handle) -> Option<String> {
    attr(handle, "class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
}

/// Direct children with the given tag
fn elements(handle: &Handle, name: &str) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|child| tag(child).as_deref() == Some(name))
        .cloned()
        .collect()
}

/// All descendants with the given tag, in document order
fn descendants(handle: &Handle, name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    for child in handle.children.borrow().iter() {
        if tag(child).as_deref() == Some(name) {
            found.push(child.clone());
        }
        found.extend(descendants(child, name));
    }
    found
}

fn find<F: Fn(&Handle) -> bool>(handle: &Handle, predicate: &F) -> Option<Handle> {
    if predicate(handle) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find(child, predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fragment_of_inline_markup() {
        let nodes = decode_fragment("<sub>2</sub>");
        assert_eq!(
            nodes,
            vec![Node::Subscript(Mark::new(vec![Inline::from("2")]))]
        );
    }

    #[test]
    fn container_only_fragment_is_empty() {
        assert!(decode_fragment("<div></div>").is_empty());
        assert!(decode_fragment("</span>").is_empty());
    }

    #[test]
    fn whitespace_is_collapsed_outside_pre() {
        let article = decode_document(
            "<html><body><p>  one\n   two </p><pre><code class=\"language-py\">a\n  b</code></pre></body></html>",
        );
        assert_eq!(
            article.content,
            vec![
                Block::paragraph(vec![Inline::from("one two")]),
                Block::CodeBlock(CodeBlock {
                    text: "a\n  b".into(),
                    programming_language: Some("py".into()),
                    ..Default::default()
                }),
            ]
        );
    }

    #[test]
    fn title_falls_back_to_title_element() {
        let article = decode_document(
            "<!doctype html><html><head><title>Plain</title></head><body><p>x</p></body></html>",
        );
        assert_eq!(article.title, Some(vec![Inline::from("Plain")]));
    }

    #[test]
    fn unknown_elements_keep_their_content() {
        let article = decode_document("<html><body><p>a <u>b</u> c</p></body></html>");
        assert_eq!(article.content, vec![Block::paragraph(vec![Inline::from("a b c")])]);
    }

    #[test]
    fn task_items_and_reversed_lists() {
        let article = decode_document(
            "<html><body><ol reversed><li><input type=\"checkbox\" checked> done</li><li>open</li></ol></body></html>",
        );
        let Block::List(list) = &article.content[0] else {
            panic!("expected list");
        };
        assert_eq!(list.order, ListOrder::Descending);
        assert_eq!(list.items[0].is_checked, Some(true));
        assert_eq!(list.items[0].content, vec![Block::paragraph(vec![Inline::from("done")])]);
        assert_eq!(list.items[1].is_checked, None);
    }

    #[test]
    fn cite_links_become_citations() {
        let nodes = decode_fragment("<cite><a href=\"#smith90\">smith90</a></cite>");
        assert_eq!(
            nodes,
            vec![Node::Cite(Cite {
                target: "smith90".into(),
                content: vec![],
            })]
        );
    }
}
