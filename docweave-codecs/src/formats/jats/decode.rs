//! JATS decoding (XML → Article)
//!
//! Every decode function takes the current [`DecodeState`] by value. Entering a `<sec>` produces a
//! new state one level deeper, so headings get their depth (and id) from where they sit without
//! any mutable bookkeeping.

use super::{normalize_id, XLINK_NS};
use crate::error::CodecError;
use docweave_schema::*;
use roxmltree::{Document, Node as XmlNode, ParsingOptions};

const TARGET: &str = "docweave::decode";

/// Where in the document a decode call sits
#[derive(Debug, Clone, Copy)]
pub(super) struct DecodeState<'a, 'input> {
    /// The `<article>` root, for resolving `rid` references
    pub article: XmlNode<'a, 'input>,
    /// Raw id of the enclosing `<sec>`, if it has one
    pub section_id: Option<&'a str>,
    pub section_depth: u8,
}

impl<'a, 'input> DecodeState<'a, 'input> {
    fn enter_section(self, section: XmlNode<'a, 'input>) -> Self {
        Self {
            section_id: section.attribute("id"),
            section_depth: self.section_depth.saturating_add(1),
            ..self
        }
    }

    /// The element with this id anywhere in the article
    fn lookup(&self, id: &str) -> Option<XmlNode<'a, 'input>> {
        self.article
            .descendants()
            .find(|node| node.is_element() && node.attribute("id") == Some(id))
    }
}

pub(super) fn decode_article(xml: &str) -> Result<Article, CodecError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document =
        Document::parse_with_options(xml, options).map_err(|err| CodecError::malformed("jats", err))?;
    let root = document.root_element();
    if root.tag_name().name() != "article" {
        return Err(CodecError::malformed(
            "jats",
            format!("expected an <article> root, found <{}>", root.tag_name().name()),
        ));
    }

    let state = DecodeState {
        article: root,
        section_id: None,
        section_depth: 0,
    };

    let mut article = Article::default();
    if let Some(meta) = child(root, "front").and_then(|front| child(front, "article-meta")) {
        decode_front(meta, state, &mut article);
    }
    if let Some(body) = child(root, "body") {
        article.content = decode_blocks(body, state);
    }
    if let Some(back) = child(root, "back") {
        article.references = elements(back, "ref-list")
            .flat_map(|list| elements(list, "ref"))
            .map(decode_reference)
            .collect();
    }
    Ok(article)
}

fn decode_front(meta: XmlNode, state: DecodeState, article: &mut Article) {
    article.title = child(meta, "title-group")
        .and_then(|group| child(group, "article-title"))
        .map(|title| decode_inlines(title, state))
        .filter(|title| !title.is_empty());

    article.authors = elements(meta, "contrib-group")
        .flat_map(|group| elements(group, "contrib"))
        .filter(|contrib| contrib.attribute("contrib-type").map_or(true, |kind| kind == "author"))
        .filter_map(|contrib| decode_contrib(contrib, state))
        .collect();

    article.date_published = elements(meta, "pub-date").next().and_then(decode_date);

    article.description = child(meta, "abstract").map(|abstract_| {
        let blocks = decode_blocks(abstract_, state);
        // The abstract's own title is presentation, not content
        blocks
            .into_iter()
            .filter(|block| !matches!(block, Block::Heading(_)))
            .collect()
    });

    article.keywords = elements(meta, "kwd-group")
        .flat_map(|group| elements(group, "kwd"))
        .map(text_content)
        .filter(|kwd| !kwd.is_empty())
        .collect();
}

fn decode_contrib(contrib: XmlNode, state: DecodeState) -> Option<Author> {
    if let Some(collab) = child(contrib, "collab") {
        return Some(Author::Organization(Organization {
            id: None,
            name: Some(text_content(collab)),
            address: None,
        }));
    }

    let mut person = child(contrib, "name")
        .map(decode_name)
        .or_else(|| child(contrib, "string-name").map(|name| Person::from_name(&text_content(name))))?;

    person.emails = contrib
        .descendants()
        .filter(|node| node.has_tag_name("email"))
        .map(text_content)
        .collect();

    for node in contrib.children().filter(XmlNode::is_element) {
        match node.tag_name().name() {
            "aff" => person.affiliations.push(decode_aff(node)),
            "xref" if node.attribute("ref-type") == Some("aff") => {
                let rids = node.attribute("rid").unwrap_or_default();
                for rid in rids.split_whitespace() {
                    match state.lookup(rid) {
                        Some(aff) => person.affiliations.push(decode_aff(aff)),
                        None => tracing::warn!(target: TARGET, rid, "affiliation not found"),
                    }
                }
            }
            _ => {}
        }
    }
    Some(Author::Person(person))
}

fn decode_name(name: XmlNode) -> Person {
    let words = |tag: &str| -> Vec<String> {
        child(name, tag)
            .map(|node| text_content(node).split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    };
    Person {
        given_names: words("given-names"),
        family_names: child(name, "surname")
            .map(text_content)
            .into_iter()
            .collect(),
        ..Default::default()
    }
}

/// `<aff>` with either structured `institution`/address parts or plain text
fn decode_aff(aff: XmlNode) -> Organization {
    let institutions: Vec<String> = elements(aff, "institution").map(text_content).collect();
    let address: Vec<String> = aff
        .children()
        .filter(|node| {
            matches!(
                node.tag_name().name(),
                "addr-line" | "city" | "state" | "postal-code" | "country"
            )
        })
        .map(text_content)
        .collect();

    let name = if institutions.is_empty() {
        let text: String = aff
            .children()
            .filter(|node| !node.has_tag_name("label"))
            .map(text_content)
            .collect::<Vec<_>>()
            .join("");
        collapse_whitespace(&text).trim().to_string()
    } else {
        institutions.join(", ")
    };

    Organization {
        id: aff.attribute("id").map(normalize_id),
        name: Some(name).filter(|name| !name.is_empty()),
        address: Some(address.join(", ")).filter(|address| !address.is_empty()),
    }
}

/// `YYYY[-MM[-DD]]` from `iso-8601-date` or the `year`/`month`/`day` children
fn decode_date(date: XmlNode) -> Option<String> {
    if let Some(iso) = date.attribute("iso-8601-date") {
        return Some(iso.to_string());
    }
    let year = child(date, "year").map(text_content)?;
    let part = |tag: &str| {
        child(date, tag)
            .map(text_content)
            .and_then(|text| text.parse::<u8>().ok())
    };
    Some(match (part("month"), part("day")) {
        (Some(month), Some(day)) => format!("{year}-{month:02}-{day:02}"),
        (Some(month), None) => format!("{year}-{month:02}"),
        _ => year,
    })
}

fn decode_reference(reference: XmlNode) -> CreativeWork {
    let citation = reference
        .children()
        .find(|node| node.has_tag_name("element-citation") || node.has_tag_name("mixed-citation"));
    let mut work = CreativeWork {
        id: reference.attribute("id").map(normalize_id),
        ..Default::default()
    };
    let Some(citation) = citation else {
        return work;
    };

    let text_of = |tag: &str| child(citation, tag).map(text_content).filter(|text| !text.is_empty());

    work.authors = elements(citation, "person-group")
        .filter(|group| group.attribute("person-group-type").map_or(true, |kind| kind == "author"))
        .flat_map(|group| group.children().filter(XmlNode::is_element))
        .chain(citation.children().filter(|node| {
            node.has_tag_name("name") || node.has_tag_name("string-name") || node.has_tag_name("collab")
        }))
        .filter_map(|node| match node.tag_name().name() {
            "name" => Some(Author::Person(decode_name(node))),
            "string-name" => Some(Author::Person(Person::from_name(&text_content(node)))),
            "collab" => Some(Author::Organization(Organization {
                name: Some(text_content(node)),
                ..Default::default()
            })),
            _ => None,
        })
        .collect();

    work.title = text_of("article-title").or_else(|| text_of("chapter-title"));
    work.is_part_of = text_of("source");
    if work.title.is_none() {
        work.title = work.is_part_of.take();
    }
    work.date_published = text_of("year");
    work.volume = text_of("volume");
    work.page_start = text_of("fpage");
    work.page_end = text_of("lpage");
    work.doi = elements(citation, "pub-id")
        .find(|id| id.attribute("pub-id-type") == Some("doi"))
        .map(text_content);
    work.url = citation
        .children()
        .find(|node| node.has_tag_name("ext-link") || node.has_tag_name("uri"))
        .and_then(|link| href(link).map(str::to_string).or_else(|| Some(text_content(link))));

    // Unstructured mixed citations keep their text as the title
    if work.title.is_none() && work.authors.is_empty() {
        let text = collapse_whitespace(&text_content(citation)).trim().to_string();
        work.title = Some(text).filter(|text| !text.is_empty());
    }
    work
}

/// Decode the element children of `parent` into block content
fn decode_blocks(parent: XmlNode, state: DecodeState) -> Vec<Block> {
    let nodes = parent
        .children()
        .flat_map(|node| decode_node(node, state))
        .collect();
    trim_paragraphs(coerce_blocks(nodes))
}

fn decode_inlines(parent: XmlNode, state: DecodeState) -> Vec<Inline> {
    let nodes = parent
        .children()
        .flat_map(|node| decode_node(node, state))
        .collect();
    coerce_inlines(nodes)
}

/// Trim the whitespace that XML indentation leaves at paragraph edges
fn trim_paragraphs(blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            Block::Paragraph(mut paragraph) => {
                paragraph.content = trim_inlines(paragraph.content);
                (!paragraph.is_empty()).then_some(Block::Paragraph(paragraph))
            }
            other => Some(other),
        })
        .collect()
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

fn decode_node(node: XmlNode, state: DecodeState) -> Vec<Node> {
    if node.is_text() {
        let text = collapse_whitespace(node.text().unwrap_or_default());
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::String(text)]
        };
    }
    if !node.is_element() {
        return Vec::new();
    }

    let id = node.attribute("id").map(normalize_id);
    let one = |node: Node| vec![node];

    match node.tag_name().name() {
        "sec" => {
            let inner = state.enter_section(node);
            node.children()
                .flat_map(|child| decode_node(child, inner))
                .collect()
        }
        "title" => one(Node::Heading(Heading {
            id: state.section_id.map(normalize_id),
            depth: state.section_depth.max(1),
            content: trim_inlines(decode_inlines(node, state)),
        })),
        "p" => {
            let mut blocks = trim_paragraphs(coerce_blocks(
                node.children().flat_map(|child| decode_node(child, state)).collect(),
            ));
            if let Some(Block::Paragraph(paragraph)) = blocks.first_mut() {
                paragraph.id = id;
            }
            blocks.into_iter().map(Node::from).collect()
        }
        "list" => one(Node::List(decode_list(node, state, id))),
        "fig" => one(Node::Figure(decode_figure(node, state, id))),
        "table-wrap" => one(Node::Table(decode_table_wrap(node, state, id))),
        "disp-quote" => one(Node::QuoteBlock(QuoteBlock {
            cite: None,
            content: decode_blocks(node, state),
        })),
        "code" if node.attribute("executable") == Some("yes") => one(Node::CodeChunk(CodeChunk {
            id,
            text: raw_text(node),
            programming_language: node.attribute("language").map(str::to_string),
            ..Default::default()
        })),
        "code" => one(Node::CodeBlock(CodeBlock {
            id,
            text: raw_text(node),
            programming_language: node.attribute("language").map(str::to_string),
            meta: Meta::new(),
        })),
        "preformat" => one(Node::CodeBlock(CodeBlock {
            id,
            text: raw_text(node),
            ..Default::default()
        })),
        "disp-formula" => decode_formula(node).map(Node::MathBlock).into_iter().collect(),
        "inline-formula" => decode_formula(node).map(Node::MathFragment).into_iter().collect(),
        "graphic" | "inline-graphic" => match href(node) {
            Some(url) => one(Node::ImageObject(ImageObject {
                id,
                media_type: node.attribute("mimetype").and_then(|kind| {
                    node.attribute("mime-subtype").map(|sub| format!("{kind}/{sub}"))
                }),
                ..ImageObject::new(url)
            })),
            None => Vec::new(),
        },
        "media" | "inline-media" => match href(node) {
            Some(url) => one(Node::MediaObject(MediaObject {
                id,
                content_url: url.to_string(),
                media_type: node.attribute("mimetype").map(|kind| {
                    match node.attribute("mime-subtype") {
                        Some(sub) => format!("{kind}/{sub}"),
                        None => kind.to_string(),
                    }
                }),
            })),
            None => Vec::new(),
        },
        "hr" => one(Node::ThematicBreak(ThematicBreak { id })),
        "italic" => one(Node::Emphasis(Mark::new(decode_inlines(node, state)))),
        "bold" => one(Node::Strong(Mark::new(decode_inlines(node, state)))),
        "strike" => one(Node::Delete(Mark::new(decode_inlines(node, state)))),
        "sup" => one(Node::Superscript(Mark::new(decode_inlines(node, state)))),
        "sub" => one(Node::Subscript(Mark::new(decode_inlines(node, state)))),
        "monospace" if node.attribute("specific-use") == Some("expression") => {
            one(Node::CodeExpression(CodeExpression {
                text: text_content(node),
                ..Default::default()
            }))
        }
        "monospace" => one(Node::CodeFragment(CodeFragment {
            text: text_content(node),
            ..Default::default()
        })),
        "named-content" if node.attribute("content-type") == Some("quote") => {
            one(Node::Quote(Quote {
                cite: href(node).map(str::to_string),
                content: decode_inlines(node, state),
            }))
        }
        "xref" => one(decode_xref(node, state)),
        "ext-link" | "uri" => {
            let content = decode_inlines(node, state);
            let target = href(node).map(str::to_string).unwrap_or_else(|| content.to_text());
            one(Node::Link(Link { id, ..Link::new(target, content) }))
        }
        // Containers whose children stand on their own
        "boxed-text" | "chem-struct" | "array" | "alternatives" | "named-content"
        | "styled-content" | "underline" | "sc" | "break" => node
            .children()
            .flat_map(|child| decode_node(child, state))
            .collect(),
        // Handled by their parents
        "label" | "caption" | "object-id" => Vec::new(),
        name => {
            tracing::warn!(target: TARGET, element = name, "unsupported JATS element, decoding children");
            node.children()
                .flat_map(|child| decode_node(child, state))
                .collect()
        }
    }
}

fn decode_xref(xref: XmlNode, state: DecodeState) -> Node {
    let rid = xref.attribute("rid").unwrap_or_default();
    let content = trim_inlines(decode_inlines(xref, state));
    match xref.attribute("ref-type") {
        Some("bibr") => Node::Cite(Cite {
            target: normalize_id(rid),
            content,
        }),
        _ => Node::Link(Link::new(format!("#{}", normalize_id(rid)), content)),
    }
}

fn decode_list(list: XmlNode, state: DecodeState, id: Option<String>) -> List {
    let order = match list.attribute("list-type") {
        Some("order") | Some("alpha-lower") | Some("alpha-upper") | Some("roman-lower")
        | Some("roman-upper") => ListOrder::Ascending,
        _ => ListOrder::Unordered,
    };
    let items = elements(list, "list-item")
        .map(|item| ListItem {
            id: item.attribute("id").map(normalize_id),
            content: decode_blocks(item, state),
            is_checked: None,
        })
        .collect();
    List {
        id,
        ..List::new(order, items)
    }
}

/// Figure content elements in order of preference
const FIGURE_CONTENT: &[&str] = &[
    "table-wrap", "table", "list", "code", "graphic", "media", "preformat", "disp-formula",
    "chem-struct", "array",
];

fn decode_figure(fig: XmlNode, state: DecodeState, id: Option<String>) -> Figure {
    let content = match child(fig, "alternatives") {
        Some(alternatives) => alternatives
            .children()
            .flat_map(|node| decode_node(node, state))
            .collect(),
        None => match FIGURE_CONTENT.iter().find_map(|tag| child(fig, tag)) {
            Some(node) => decode_node(node, state),
            // Anything else but the label and caption, e.g. a `p` or `disp-quote`
            None => fig
                .children()
                .filter(|node| !node.has_tag_name("label") && !node.has_tag_name("caption"))
                .flat_map(|node| decode_node(node, state))
                .filter(|node| !matches!(node, Node::String(text) if text.trim().is_empty()))
                .collect(),
        },
    };
    Figure {
        id,
        label: child(fig, "label").map(text_content),
        caption: child(fig, "caption")
            .map(|caption| decode_caption(caption, state))
            .unwrap_or_default(),
        content,
    }
}

/// Caption titles become paragraphs; a heading there would split the section structure
fn decode_caption(caption: XmlNode, state: DecodeState) -> Vec<Block> {
    decode_blocks(caption, state)
        .into_iter()
        .map(|block| match block {
            Block::Heading(heading) => Block::paragraph(heading.content),
            other => other,
        })
        .collect()
}

fn decode_table_wrap(wrap: XmlNode, state: DecodeState, id: Option<String>) -> Table {
    let rows = wrap
        .descendants()
        .find(|node| node.has_tag_name("table"))
        .map(|table| decode_rows(table, state))
        .unwrap_or_default();
    Table {
        id,
        label: child(wrap, "label").map(text_content),
        caption: child(wrap, "caption")
            .map(|caption| decode_caption(caption, state))
            .unwrap_or_default(),
        rows,
    }
}

fn decode_rows(table: XmlNode, state: DecodeState) -> Vec<TableRow> {
    table
        .descendants()
        .filter(|node| node.has_tag_name("tr"))
        .map(|tr| {
            let section = tr.parent().map(|parent| parent.tag_name().name());
            let cells: Vec<TableCell> = tr
                .children()
                .filter(|cell| cell.has_tag_name("td") || cell.has_tag_name("th"))
                .map(|cell| TableCell {
                    content: trim_inlines(decode_inlines(cell, state)),
                    cell_type: cell
                        .has_tag_name("th")
                        .then_some(TableCellType::Header),
                    column_span: cell.attribute("colspan").and_then(|span| span.parse().ok()),
                    row_span: cell.attribute("rowspan").and_then(|span| span.parse().ok()),
                })
                .collect();
            let row_type = match section {
                Some("thead") => Some(TableRowType::Header),
                Some("tfoot") => Some(TableRowType::Footer),
                _ => None,
            };
            TableRow { cells, row_type }
        })
        .collect()
}

/// TeX from `tex-math`, otherwise the MathML source of `mml:math`
fn decode_formula(formula: XmlNode) -> Option<Math> {
    let id = formula.attribute("id").map(normalize_id);
    if let Some(tex) = formula.descendants().find(|node| node.has_tag_name("tex-math")) {
        return Some(Math {
            id,
            ..Math::tex(text_content(tex).trim())
        });
    }
    if let Some(mathml) = formula.descendants().find(|node| node.tag_name().name() == "math") {
        let source = &formula.document().input_text()[mathml.range()];
        return Some(Math {
            id,
            text: source.to_string(),
            math_language: Some("mathml".to_string()),
        });
    }
    tracing::warn!(target: TARGET, "formula without TeX or MathML, dropped");
    None
}

fn href<'a>(node: XmlNode<'a, '_>) -> Option<&'a str> {
    node.attribute((XLINK_NS, "href"))
        .or_else(|| node.attribute("href"))
}

fn child<'a, 'input>(node: XmlNode<'a, 'input>, tag: &str) -> Option<XmlNode<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn elements<'a, 'input: 'a>(
    node: XmlNode<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = XmlNode<'a, 'input>> + 'a {
    node.children().filter(move |child| child.has_tag_name(tag))
}

/// All descendant text, whitespace collapsed and trimmed
fn text_content(node: XmlNode) -> String {
    let text: String = node
        .descendants()
        .filter(XmlNode::is_text)
        .filter_map(|text| text.text())
        .collect();
    collapse_whitespace(&text).trim().to_string()
}

/// All descendant text, verbatim
fn raw_text(node: XmlNode) -> String {
    node.descendants()
        .filter(XmlNode::is_text)
        .filter_map(|text| text.text())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(body: &str) -> Article {
        let xml = format!(
            r#"<article xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:mml="http://www.w3.org/1998/Math/MathML">{body}</article>"#
        );
        decode_article(&xml).unwrap()
    }

    #[test]
    fn sections_set_heading_depth_and_id() {
        let article = decode(
            "<body><sec id=\"s.1\"><title>Intro</title><p>Text</p>\
             <sec><title>Detail</title></sec></sec></body>",
        );
        assert_eq!(
            article.content,
            vec![
                Block::Heading(Heading {
                    id: Some("s-1".into()),
                    depth: 1,
                    content: vec![Inline::from("Intro")],
                }),
                Block::paragraph(vec![Inline::from("Text")]),
                Block::Heading(Heading::new(2, vec![Inline::from("Detail")])),
            ]
        );
    }

    #[test]
    fn affiliations_resolve_inline_and_by_reference() {
        let article = decode(
            r#"<front><article-meta>
                 <title-group><article-title>A <italic>study</italic></article-title></title-group>
                 <contrib-group>
                   <contrib contrib-type="author">
                     <name><surname>Smith</surname><given-names>Ann B</given-names></name>
                     <email>ann@example.org</email>
                     <xref ref-type="aff" rid="aff1"/>
                     <aff><institution>Inline Lab</institution></aff>
                   </contrib>
                 </contrib-group>
                 <aff id="aff1"><label>1</label><institution>Uni</institution><country>NZ</country></aff>
               </article-meta></front>"#,
        );
        assert_eq!(
            article.title,
            Some(vec![
                Inline::from("A "),
                Inline::Emphasis(Mark::new(vec![Inline::from("study")])),
            ])
        );
        let Author::Person(person) = &article.authors[0] else {
            panic!("expected a person");
        };
        assert_eq!(person.given_names, vec!["Ann", "B"]);
        assert_eq!(person.emails, vec!["ann@example.org"]);
        assert_eq!(
            person.affiliations,
            vec![
                Organization {
                    id: Some("aff1".into()),
                    name: Some("Uni".into()),
                    address: Some("NZ".into()),
                },
                Organization {
                    id: None,
                    name: Some("Inline Lab".into()),
                    address: None,
                },
            ]
        );
    }

    #[test]
    fn references_and_citations() {
        let article = decode(
            r#"<body><p>See <xref ref-type="bibr" rid="r.1">Smith, 1990</xref>.</p></body>
               <back><ref-list><ref id="r.1"><element-citation>
                 <person-group person-group-type="author"><name><surname>Smith</surname><given-names>A</given-names></name></person-group>
                 <article-title>On things</article-title><source>J Things</source><year>1990</year>
                 <volume>3</volume><fpage>1</fpage><lpage>9</lpage>
                 <pub-id pub-id-type="doi">10.1/x</pub-id>
               </element-citation></ref></ref-list></back>"#,
        );
        assert_eq!(
            article.content,
            vec![Block::paragraph(vec![
                Inline::from("See "),
                Inline::Cite(Cite {
                    target: "r-1".into(),
                    content: vec![Inline::from("Smith, 1990")],
                }),
                Inline::from("."),
            ])]
        );
        let reference = &article.references[0];
        assert_eq!(reference.id.as_deref(), Some("r-1"));
        assert_eq!(reference.title.as_deref(), Some("On things"));
        assert_eq!(reference.is_part_of.as_deref(), Some("J Things"));
        assert_eq!(reference.year(), Some("1990"));
        assert_eq!(reference.doi.as_deref(), Some("10.1/x"));
        assert_eq!(reference.page_end.as_deref(), Some("9"));
    }

    #[test]
    fn figure_prefers_listed_content() {
        let article = decode(
            r#"<body><fig id="f1"><label>Figure 1</label><caption><title>Plot</title><p>Details.</p></caption>
                 <graphic xlink:href="plot.png"/></fig></body>"#,
        );
        assert_eq!(
            article.content,
            vec![Block::Figure(Figure {
                id: Some("f1".into()),
                label: Some("Figure 1".into()),
                caption: vec![
                    Block::paragraph(vec![Inline::from("Plot")]),
                    Block::paragraph(vec![Inline::from("Details.")]),
                ],
                content: vec![Node::ImageObject(ImageObject::new("plot.png"))],
            })]
        );
    }

    #[test]
    fn mathml_is_kept_as_source() {
        let article = decode(
            r#"<body><disp-formula><mml:math><mml:mi>x</mml:mi></mml:math></disp-formula></body>"#,
        );
        assert_eq!(
            article.content,
            vec![Block::MathBlock(Math {
                id: None,
                text: "<mml:math><mml:mi>x</mml:mi></mml:math>".into(),
                math_language: Some("mathml".into()),
            })]
        );
    }

    #[test]
    fn non_article_root_is_malformed() {
        assert!(matches!(
            decode_article("<book/>"),
            Err(CodecError::MalformedInput { .. })
        ));
    }
}
