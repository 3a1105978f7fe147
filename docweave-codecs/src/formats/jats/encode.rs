//! JATS encoding (Article → XML)
//!
//! Two passes over an [`EncodeState`]: the first renders the citation text of every reference,
//! the second walks the tree. A `Cite` in the body therefore gets its text even though the
//! reference list is written after it.

use super::citations::citation_text;
use super::sections::SectionStack;
use super::xml::Element;
use super::{normalize_id, DOCTYPE, MATHML_NS, XLINK_NS};
use docweave_schema::visit::{walk_blocks, walk_inline};
use docweave_schema::*;
use std::collections::HashMap;

const TARGET: &str = "docweave::encode";

#[derive(Debug, Default)]
pub(super) struct EncodeState {
    /// Tables encoded so far, for `Table N` labels
    table_count: u32,
    /// Citation text keyed by reference id
    citations: HashMap<String, String>,
}

impl EncodeState {
    /// First pass: citation text for every reference with an id
    fn collect_citations(&mut self, article: &Article) {
        for reference in &article.references {
            if let Some(id) = &reference.id {
                self.citations
                    .insert(normalize_id(id), citation_text(reference));
            }
        }

        let mut cited = CiteTargets::default();
        walk_blocks(&mut cited, &article.content);
        for target in cited.targets {
            if !self.citations.contains_key(&normalize_id(&target)) {
                tracing::warn!(target: TARGET, cite = target.as_str(), "citation has no matching reference");
            }
        }
    }
}

#[derive(Default)]
struct CiteTargets {
    targets: Vec<String>,
}

impl Visitor for CiteTargets {
    fn visit_inline(&mut self, inline: &Inline) {
        if let Inline::Cite(cite) = inline {
            self.targets.push(cite.target.clone());
        }
        walk_inline(self, inline);
    }
}

pub(super) fn encode_article(article: &Article) -> String {
    let mut state = EncodeState::default();
    state.collect_citations(article);

    let root = Element::new("article")
        .attr("xmlns:xlink", XLINK_NS)
        .attr("xmlns:mml", MATHML_NS)
        .attr("article-type", "research-article")
        .attr("dtd-version", "1.2")
        .child(encode_front(article, &mut state))
        .child(encode_body(&article.content, &mut state));

    let root = if article.references.is_empty() {
        root
    } else {
        root.child(encode_back(&article.references))
    };

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{DOCTYPE}\n{}\n",
        root.to_xml()
    )
}

fn encode_front(article: &Article, state: &mut EncodeState) -> Element {
    let mut meta = Element::new("article-meta");

    let mut title = Element::new("article-title");
    if let Some(inlines) = &article.title {
        encode_inlines(&mut title, inlines, state);
    }
    meta.push(Element::new("title-group").child(title));

    let mut affiliations: Vec<Organization> = Vec::new();
    if !article.authors.is_empty() {
        let mut group = Element::new("contrib-group");
        for author in &article.authors {
            group.push(encode_contrib(author, &mut affiliations));
        }
        meta.push(group);
    }
    for org in &affiliations {
        meta.push(encode_aff(org));
    }

    if let Some(date) = &article.date_published {
        meta.push(encode_date(date));
    }

    if let Some(description) = &article.description {
        let mut abstract_ = Element::new("abstract");
        encode_blocks(&mut abstract_, description, state);
        meta.push(abstract_);
    }

    if !article.keywords.is_empty() {
        let mut group = Element::new("kwd-group");
        for keyword in &article.keywords {
            group.push(Element::new("kwd").text(keyword.as_str()));
        }
        meta.push(group);
    }

    Element::new("front").child(meta)
}

/// A contributor, registering its affiliations in `affiliations` and referencing them by id
fn encode_contrib(author: &Author, affiliations: &mut Vec<Organization>) -> Element {
    let contrib = Element::new("contrib").attr("contrib-type", "author");
    let person = match author {
        Author::Organization(org) => {
            return contrib.child(Element::new("collab").text(org.name.clone().unwrap_or_default()));
        }
        Author::Person(person) => person,
    };

    let mut name = Element::new("name");
    name.push(Element::new("surname").text(person.family_names.join(" ")));
    if !person.given_names.is_empty() {
        name.push(Element::new("given-names").text(person.given_names.join(" ")));
    }
    let mut contrib = contrib.child(name);
    for email in &person.emails {
        contrib.push(Element::new("email").text(email.as_str()));
    }

    for org in &person.affiliations {
        let index = match affiliations.iter().position(|known| same_org(known, org)) {
            Some(index) => index,
            None => {
                let mut org = org.clone();
                if org.id.is_none() {
                    org.id = Some(format!("aff{}", affiliations.len() + 1));
                }
                affiliations.push(org);
                affiliations.len() - 1
            }
        };
        let rid = affiliations[index].id.clone().unwrap_or_default();
        contrib.push(Element::new("xref").attr("ref-type", "aff").attr("rid", rid));
    }
    contrib
}

fn same_org(a: &Organization, b: &Organization) -> bool {
    match (&a.id, &b.id) {
        (Some(a), Some(b)) => a == b,
        _ => a.name == b.name && a.address == b.address,
    }
}

fn encode_aff(org: &Organization) -> Element {
    let mut aff = Element::new("aff").opt_attr("id", org.id.as_deref().map(normalize_id).as_deref());
    if let Some(name) = &org.name {
        aff.push(Element::new("institution").text(name.as_str()));
    }
    if let Some(address) = &org.address {
        aff.push(Element::new("addr-line").text(address.as_str()));
    }
    aff
}

/// `YYYY[-MM[-DD]]` into `<pub-date>` parts, keeping the original in `iso-8601-date`
fn encode_date(date: &str) -> Element {
    let mut pub_date = Element::new("pub-date")
        .attr("pub-type", "epub")
        .attr("iso-8601-date", date);
    let mut parts = date.split('-');
    let year = parts.next().unwrap_or_default();
    if let Some(day) = parts.clone().nth(1) {
        pub_date.push(Element::new("day").text(day));
    }
    if let Some(month) = parts.next() {
        pub_date.push(Element::new("month").text(month));
    }
    pub_date.push(Element::new("year").text(year));
    pub_date
}

fn encode_body(blocks: &[Block], state: &mut EncodeState) -> Element {
    let mut sections = SectionStack::new(Element::new("body"));
    for block in blocks {
        match block {
            Block::Heading(heading) => {
                let mut title = Element::new("title");
                encode_inlines(&mut title, &heading.content, state);
                let sec = Element::new("sec")
                    .opt_attr("id", heading.id.as_deref().map(normalize_id).as_deref())
                    .child(title);
                sections.on_heading(heading.depth.max(1), sec);
            }
            block => encode_block(sections.current(), block, state),
        }
    }
    sections.close_all()
}

fn encode_blocks(parent: &mut Element, blocks: &[Block], state: &mut EncodeState) {
    for block in blocks {
        encode_block(parent, block, state);
    }
}

fn encode_block(parent: &mut Element, block: &Block, state: &mut EncodeState) {
    match block {
        Block::Paragraph(paragraph) => {
            let mut p = Element::new("p").opt_attr("id", paragraph.id.as_deref());
            encode_inlines(&mut p, &paragraph.content, state);
            parent.push(p);
        }
        // Headings outside the body (abstract, captions) have no section to open
        Block::Heading(heading) => {
            let mut title = Element::new("title");
            encode_inlines(&mut title, &heading.content, state);
            parent.push(title);
        }
        Block::List(list) => {
            let kind = if list.is_ordered() { "order" } else { "bullet" };
            let mut el = Element::new("list")
                .opt_attr("id", list.id.as_deref())
                .attr("list-type", kind);
            for item in &list.items {
                let mut li = Element::new("list-item").opt_attr("id", item.id.as_deref());
                encode_blocks(&mut li, &item.content, state);
                el.push(li);
            }
            parent.push(el);
        }
        Block::Table(table) => parent.push(encode_table(table, state)),
        Block::CodeBlock(code) => parent.push(
            Element::new("code")
                .opt_attr("id", code.id.as_deref())
                .opt_attr("language", code.programming_language.as_deref())
                .text(code.text.as_str()),
        ),
        Block::CodeChunk(chunk) => {
            if !chunk.outputs.is_empty() || !chunk.caption.is_empty() {
                tracing::warn!(target: TARGET, "code chunk outputs and caption have no JATS form, dropped");
            }
            parent.push(
                Element::new("code")
                    .opt_attr("id", chunk.id.as_deref())
                    .attr("executable", "yes")
                    .opt_attr("language", chunk.programming_language.as_deref())
                    .text(chunk.text.as_str()),
            );
        }
        Block::QuoteBlock(quote) => {
            let mut el = Element::new("disp-quote");
            encode_blocks(&mut el, &quote.content, state);
            parent.push(el);
        }
        Block::Figure(figure) => parent.push(encode_figure(figure, state)),
        Block::ThematicBreak(_) => parent.push(Element::new("hr")),
        Block::MathBlock(math) => parent.push(encode_math("disp-formula", math)),
        Block::Collection(collection) => {
            for part in &collection.parts {
                encode_node_block(parent, part, state);
            }
        }
        Block::Include(include) => {
            tracing::warn!(
                target: TARGET,
                source = include.source.as_str(),
                "include has no JATS form, writing its content"
            );
            encode_blocks(parent, &include.content, state);
        }
    }
}

/// Blocks as blocks; anything else wrapped in a paragraph
fn encode_node_block(parent: &mut Element, node: &Node, state: &mut EncodeState) {
    match Block::try_from(node.clone()) {
        Ok(block) => encode_block(parent, &block, state),
        Err(err) => {
            let node = err.into_node();
            let inline = Inline::try_from(node).unwrap_or_else(|err| Inline::String(err.into_node().to_text()));
            let mut p = Element::new("p");
            encode_inline(&mut p, &inline, state);
            parent.push(p);
        }
    }
}

fn encode_table(table: &Table, state: &mut EncodeState) -> Element {
    state.table_count += 1;
    let label = table
        .label
        .clone()
        .unwrap_or_else(|| format!("Table {}", state.table_count));

    let mut wrap = Element::new("table-wrap")
        .opt_attr("id", table.id.as_deref())
        .child(Element::new("label").text(label));
    if !table.caption.is_empty() {
        let mut caption = Element::new("caption");
        encode_blocks(&mut caption, &table.caption, state);
        wrap.push(caption);
    }

    let mut head = Element::new("thead");
    let mut body = Element::new("tbody");
    let mut foot = Element::new("tfoot");
    for row in &table.rows {
        let mut tr = Element::new("tr");
        for cell in &row.cells {
            let header = row.is_header() || cell.cell_type == Some(TableCellType::Header);
            let mut td = Element::new(if header { "th" } else { "td" });
            if let Some(span) = cell.column_span {
                td.set_attr("colspan", span.to_string());
            }
            if let Some(span) = cell.row_span {
                td.set_attr("rowspan", span.to_string());
            }
            encode_inlines(&mut td, &cell.content, state);
            tr.push(td);
        }
        match row.row_type {
            Some(TableRowType::Header) => head.push(tr),
            Some(TableRowType::Footer) => foot.push(tr),
            None => body.push(tr),
        }
    }

    let mut el = Element::new("table");
    for section in [head, body, foot] {
        if !section.is_empty() {
            el.push(section);
        }
    }
    wrap.child(el)
}

fn encode_figure(figure: &Figure, state: &mut EncodeState) -> Element {
    let mut fig = Element::new("fig").opt_attr("id", figure.id.as_deref());
    if let Some(label) = &figure.label {
        fig.push(Element::new("label").text(label.as_str()));
    }
    if !figure.caption.is_empty() {
        let mut caption = Element::new("caption");
        encode_blocks(&mut caption, &figure.caption, state);
        fig.push(caption);
    }

    match figure.content.as_slice() {
        [] => {}
        [single] => encode_figure_content(&mut fig, single, state),
        several => {
            let mut alternatives = Element::new("alternatives");
            for node in several {
                encode_figure_content(&mut alternatives, node, state);
            }
            fig.push(alternatives);
        }
    }
    fig
}

/// Images and media go in as `graphic`/`media`; everything else as blocks
fn encode_figure_content(parent: &mut Element, node: &Node, state: &mut EncodeState) {
    match node {
        Node::ImageObject(image) => parent.push(encode_image("graphic", image)),
        Node::MediaObject(media) => parent.push(encode_media("media", media)),
        other => encode_node_block(parent, other, state),
    }
}

fn encode_image(tag: &str, image: &ImageObject) -> Element {
    let mut el = Element::new(tag).opt_attr("id", image.id.as_deref());
    if let Some((kind, sub)) = image.media_type.as_deref().and_then(|m| m.split_once('/')) {
        el = el.attr("mimetype", kind).attr("mime-subtype", sub);
    }
    el.attr("xlink:href", image.content_url.as_str())
}

fn encode_media(tag: &str, media: &MediaObject) -> Element {
    let mut el = Element::new(tag).opt_attr("id", media.id.as_deref());
    if let Some(media_type) = media.media_type.as_deref() {
        el = match media_type.split_once('/') {
            Some((kind, sub)) => el.attr("mimetype", kind).attr("mime-subtype", sub),
            None => el.attr("mimetype", media_type),
        };
    }
    el.attr("xlink:href", media.content_url.as_str())
}

fn encode_math(tag: &str, math: &Math) -> Element {
    let mut el = Element::new(tag).opt_attr("id", math.id.as_deref());
    if math.is_tex() {
        el.push(Element::new("tex-math").text(math.text.as_str()));
    } else if math.math_language.as_deref() == Some("mathml") {
        el.push_raw(math.text.as_str());
    } else {
        tracing::warn!(
            target: TARGET,
            language = math.math_language.as_deref().unwrap_or_default(),
            "math language has no JATS form, written as text"
        );
        el.push_text(math.text.as_str());
    }
    el
}

fn encode_inlines(parent: &mut Element, inlines: &[Inline], state: &mut EncodeState) {
    for inline in inlines {
        encode_inline(parent, inline, state);
    }
}

fn marked(tag: &str, mark: &Mark, state: &mut EncodeState) -> Element {
    let mut el = Element::new(tag);
    encode_inlines(&mut el, &mark.content, state);
    el
}

fn encode_inline(parent: &mut Element, inline: &Inline, state: &mut EncodeState) {
    match inline {
        Inline::String(text) => parent.push_text(text.as_str()),
        Inline::Emphasis(mark) => parent.push(marked("italic", mark, state)),
        Inline::Strong(mark) => parent.push(marked("bold", mark, state)),
        Inline::Delete(mark) => parent.push(marked("strike", mark, state)),
        Inline::Superscript(mark) => parent.push(marked("sup", mark, state)),
        Inline::Subscript(mark) => parent.push(marked("sub", mark, state)),
        Inline::Link(link) => {
            let mut el = match link.target.strip_prefix('#') {
                Some(rid) => Element::new("xref").attr("rid", normalize_id(rid)),
                None => Element::new("ext-link")
                    .attr("ext-link-type", "uri")
                    .attr("xlink:href", link.target.as_str()),
            };
            encode_inlines(&mut el, &link.content, state);
            parent.push(el);
        }
        Inline::Cite(cite) => {
            let rid = normalize_id(&cite.target);
            let mut el = Element::new("xref").attr("ref-type", "bibr").attr("rid", rid.as_str());
            if cite.content.is_empty() {
                let text = state.citations.get(&rid).cloned().unwrap_or(rid);
                el.push_text(text);
            } else {
                encode_inlines(&mut el, &cite.content, state);
            }
            parent.push(el);
        }
        Inline::Quote(quote) => {
            let mut el = Element::new("named-content").attr("content-type", "quote");
            if let Some(cite) = &quote.cite {
                el.set_attr("xlink:href", cite.as_str());
            }
            encode_inlines(&mut el, &quote.content, state);
            parent.push(el);
        }
        Inline::CodeFragment(code) => {
            parent.push(Element::new("monospace").text(code.text.as_str()));
        }
        Inline::CodeExpression(expr) => parent.push(
            Element::new("monospace")
                .attr("specific-use", "expression")
                .text(expr.text.as_str()),
        ),
        Inline::ImageObject(image) => parent.push(encode_image("inline-graphic", image)),
        Inline::MediaObject(media) => parent.push(encode_media("inline-media", media)),
        Inline::MathFragment(math) => parent.push(encode_math("inline-formula", math)),
        Inline::Null
        | Inline::Boolean(_)
        | Inline::Integer(_)
        | Inline::Number(_)
        | Inline::Array(_)
        | Inline::Object(_) => parent.push_text(inline.to_text()),
    }
}

fn encode_back(references: &[CreativeWork]) -> Element {
    let mut list = Element::new("ref-list");
    for reference in references {
        list.push(encode_reference(reference));
    }
    Element::new("back").child(list)
}

fn encode_reference(work: &CreativeWork) -> Element {
    let mut citation = Element::new("element-citation").attr(
        "publication-type",
        if work.is_part_of.is_some() { "journal" } else { "other" },
    );

    if !work.authors.is_empty() {
        let mut group = Element::new("person-group").attr("person-group-type", "author");
        for author in &work.authors {
            match author {
                Author::Person(person) => {
                    let mut name = Element::new("name")
                        .child(Element::new("surname").text(person.family_names.join(" ")));
                    if !person.given_names.is_empty() {
                        name.push(Element::new("given-names").text(person.given_names.join(" ")));
                    }
                    group.push(name);
                }
                Author::Organization(org) => {
                    group.push(Element::new("collab").text(org.name.clone().unwrap_or_default()));
                }
            }
        }
        citation.push(group);
    }

    let mut field = |tag: &str, value: &Option<String>| {
        if let Some(value) = value {
            citation.push(Element::new(tag).text(value.as_str()));
        }
    };
    field("article-title", &work.title);
    field("source", &work.is_part_of);
    field("year", &work.year().map(str::to_string).or_else(|| work.date_published.clone()));
    field("volume", &work.volume);
    field("fpage", &work.page_start);
    field("lpage", &work.page_end);

    if let Some(doi) = &work.doi {
        citation.push(
            Element::new("pub-id")
                .attr("pub-id-type", "doi")
                .text(doi.as_str()),
        );
    }
    if let Some(url) = &work.url {
        citation.push(
            Element::new("ext-link")
                .attr("ext-link-type", "uri")
                .attr("xlink:href", url.as_str())
                .text(url.as_str()),
        );
    }

    Element::new("ref")
        .opt_attr("id", work.id.as_deref().map(normalize_id).as_deref())
        .child(citation)
}
