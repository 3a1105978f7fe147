//! Markdown parsing (Markdown → Node)
//!
//! Pipeline: Markdown string → Comrak AST → block items → fence assembly → Node blocks
//!
//! Block children of a container are first turned into [`Item`]s so that the `name:`/`:::` fences
//! of block extensions, which comrak sees as ordinary paragraphs, can be matched up across
//! siblings. Inline children are flattened into a [`Piece`] stream with adjacent text merged, so
//! extension syntax split over several comrak nodes (`!quote` followed by a link) is visible as a
//! whole.

use super::attrs;
use super::comrak_options;
use super::extensions::{self, ExtensionKind, Scanned};
use crate::formats::html::decode_fragment;
use crate::media_types;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena};
use docweave_schema::*;
use once_cell::sync::Lazy;
use regex::Regex;

const TARGET: &str = "docweave::decode";

/// Inline HTML tags whose open and close are matched up around the pieces between them
static PAIRED_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(sub|sup|del|s|em|strong|q)(\s[^>]*)?>$").expect("valid tag regex")
});

static CITE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"cite="([^"]*)""#).expect("valid attribute regex"));

/// Decode a complete markdown document
pub(crate) fn decode_article(markdown: &str) -> Article {
    let (front_matter, mut content) = parse_blocks(markdown);

    let mut article = front_matter
        .as_deref()
        .map(parse_front_matter)
        .unwrap_or_default();

    if matches!(content.first(), Some(Block::Heading(heading)) if heading.depth == 1) {
        if let Block::Heading(heading) = content.remove(0) {
            article.title = Some(heading.content);
        }
    }
    article.content = content;
    article
}

/// Decode markdown into blocks, ignoring front matter and without promoting a title
pub(crate) fn decode_blocks(markdown: &str) -> Vec<Block> {
    parse_blocks(markdown).1
}

fn parse_blocks(markdown: &str) -> (Option<String>, Vec<Block>) {
    let arena = Arena::new();
    let options = comrak_options(0);
    let root = parse_document(&arena, markdown, &options);

    let mut front_matter = None;
    let mut items = Vec::new();
    for child in root.children() {
        if let NodeValue::FrontMatter(literal) = &child.data.borrow().value {
            front_matter = Some(literal.clone());
            continue;
        }
        decode_block(child, &mut items);
    }
    (front_matter, assemble(items))
}

fn parse_front_matter(literal: &str) -> Article {
    let yaml = literal
        .trim()
        .strip_prefix("---")
        .and_then(|rest| rest.strip_suffix("---"))
        .unwrap_or_default();

    let value: serde_json::Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(target: TARGET, error = %err, "front matter is not valid YAML, ignored");
            return Article::default();
        }
    };
    let serde_json::Value::Object(mut fields) = value else {
        if !value.is_null() {
            tracing::warn!(target: TARGET, "front matter is not a mapping, ignored");
        }
        return Article::default();
    };
    fields.remove("type");
    fields.remove("content");

    serde_json::from_value(serde_json::Value::Object(fields)).unwrap_or_else(|err| {
        tracing::warn!(target: TARGET, error = %err, "front matter does not fit an article, ignored");
        Article::default()
    })
}

/// A decoded block child, before block extension fences are matched up
enum Item {
    Open { name: String, argument: String },
    Close(Meta),
    Block(Block),
}

struct Fence {
    name: String,
    argument: String,
    blocks: Vec<Block>,
}

fn decode_blocks_of<'a>(node: &'a AstNode<'a>) -> Vec<Block> {
    let mut items = Vec::new();
    for child in node.children() {
        decode_block(child, &mut items);
    }
    assemble(items)
}

fn decode_block<'a>(node: &'a AstNode<'a>, items: &mut Vec<Item>) {
    let block = match &node.data.borrow().value {
        NodeValue::Paragraph => {
            decode_paragraph(node, items);
            return;
        }
        NodeValue::Heading(heading) => Block::Heading(decode_heading(node, heading.level)),
        NodeValue::List(list) => Block::List(decode_list(node, list.list_type)),
        NodeValue::CodeBlock(code) => Block::CodeBlock(decode_code_block(&code.info, &code.literal)),
        NodeValue::BlockQuote => Block::QuoteBlock(QuoteBlock {
            cite: None,
            content: decode_blocks_of(node),
        }),
        NodeValue::ThematicBreak => Block::ThematicBreak(ThematicBreak::default()),
        NodeValue::HtmlBlock(html) => {
            let blocks = coerce_blocks(decode_fragment(&html.literal));
            items.extend(blocks.into_iter().map(Item::Block));
            return;
        }
        NodeValue::Table(_) => Block::Table(decode_table(node)),
        NodeValue::FrontMatter(_) => return,
        other => {
            tracing::warn!(target: TARGET, node = ?other, "unsupported markdown block, skipped");
            return;
        }
    };
    items.push(Item::Block(block));
}

fn decode_paragraph<'a>(node: &'a AstNode<'a>, items: &mut Vec<Item>) {
    if let Some(text) = plain_text(node) {
        if let Some((name, argument)) = extensions::parse_fence_open(&text) {
            items.push(Item::Open { name, argument });
            return;
        }
        if let Some(props) = extensions::parse_fence_close(&text) {
            items.push(Item::Close(props));
            return;
        }
    }

    if let Some(math) = display_math(node) {
        items.push(Item::Block(Block::MathBlock(math)));
        return;
    }

    // Embedded HTML may decode to blocks; coercion splits the paragraph around them
    let blocks = coerce_blocks(decode_inline_nodes(node));
    items.extend(blocks.into_iter().map(Item::Block));
}

/// Display math that is the only thing in its paragraph
fn display_math<'a>(node: &'a AstNode<'a>) -> Option<Math> {
    let mut found = None;
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Math(math) if math.display_math && found.is_none() => {
                found = Some(Math::tex(math.literal.trim()));
            }
            NodeValue::Text(text) if text.trim().is_empty() => {}
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            _ => return None,
        }
    }
    found
}

/// Text of a paragraph made only of text, breaks, escapes and autolinks; breaks become newlines
fn plain_text<'a>(node: &'a AstNode<'a>) -> Option<String> {
    let mut text = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
            NodeValue::Link(_) | NodeValue::Escaped => text.push_str(&plain_text(child)?),
            _ => return None,
        }
    }
    Some(text)
}

/// Match fences to the blocks between them
fn assemble(items: Vec<Item>) -> Vec<Block> {
    let mut top = Vec::new();
    let mut open: Vec<Fence> = Vec::new();

    for item in items {
        match item {
            Item::Block(block) => target(&mut open, &mut top).push(block),
            Item::Open { name, argument } => open.push(Fence {
                name,
                argument,
                blocks: Vec::new(),
            }),
            Item::Close(props) => match open.pop() {
                Some(fence) => {
                    let blocks = finish_fence(fence, props);
                    target(&mut open, &mut top).extend(blocks);
                }
                None => {
                    tracing::warn!(target: TARGET, "closing fence without an opening one");
                    target(&mut open, &mut top).push(Block::paragraph(vec![Inline::from(":::")]));
                }
            },
        }
    }

    while let Some(fence) = open.pop() {
        tracing::warn!(target: TARGET, name = %fence.name, "unclosed block extension, kept as plain blocks");
        target(&mut open, &mut top).extend(fence.blocks);
    }
    top
}

fn target<'v>(open: &'v mut [Fence], top: &'v mut Vec<Block>) -> &'v mut Vec<Block> {
    match open.last_mut() {
        Some(fence) => &mut fence.blocks,
        None => top,
    }
}

fn finish_fence(fence: Fence, mut props: Meta) -> Vec<Block> {
    let id = props.remove("id");
    let argument = Some(fence.argument).filter(|argument| !argument.is_empty());

    match ExtensionKind::from_name(&fence.name) {
        Some(ExtensionKind::Chunk) => {
            let mut blocks = fence.blocks.into_iter();
            let Some(Block::CodeBlock(source)) = blocks.next() else {
                tracing::warn!(target: TARGET, "code chunk without source code, dropped");
                return Vec::new();
            };
            let mut meta = source.meta;
            meta.extend(props);
            let outputs = split_on_breaks(blocks.collect())
                .into_iter()
                .flat_map(unwrap_group)
                .collect();
            vec![Block::CodeChunk(CodeChunk {
                id: id.or(source.id),
                label: argument,
                text: source.text,
                programming_language: source.programming_language,
                meta,
                outputs,
                caption: Vec::new(),
            })]
        }
        Some(ExtensionKind::Figure) => {
            let mut groups = split_first_break(fence.blocks);
            let caption = groups.1.take().unwrap_or_default();
            vec![Block::Figure(Figure {
                id,
                label: argument,
                caption,
                content: unwrap_group(groups.0),
            })]
        }
        Some(ExtensionKind::Include) => vec![Block::Include(Include {
            source: argument.unwrap_or_default(),
            media_type: props.remove("mediaType"),
            content: fence.blocks,
        })],
        _ => {
            tracing::warn!(
                target: TARGET,
                name = %fence.name,
                "unknown block extension, kept as plain blocks"
            );
            fence.blocks
        }
    }
}

fn split_on_breaks(blocks: Vec<Block>) -> Vec<Vec<Block>> {
    let mut groups = vec![Vec::new()];
    for block in blocks {
        match block {
            Block::ThematicBreak(_) => groups.push(Vec::new()),
            block => {
                if let Some(group) = groups.last_mut() {
                    group.push(block);
                }
            }
        }
    }
    groups.retain(|group| !group.is_empty());
    groups
}

fn split_first_break(blocks: Vec<Block>) -> (Vec<Block>, Option<Vec<Block>>) {
    let mut before = Vec::new();
    let mut iter = blocks.into_iter();
    for block in iter.by_ref() {
        if matches!(block, Block::ThematicBreak(_)) {
            return (before, Some(iter.collect()));
        }
        before.push(block);
    }
    (before, None)
}

/// A lone paragraph holding a single inline stands for that bare value
fn unwrap_group(group: Vec<Block>) -> Vec<Node> {
    match <[Block; 1]>::try_from(group) {
        Ok([Block::Paragraph(mut p)]) if p.content.len() == 1 => {
            p.content.pop().map(Node::from).into_iter().collect()
        }
        Ok([block]) => vec![Node::from(block)],
        Err(group) => group.into_iter().map(Node::from).collect(),
    }
}

fn decode_heading<'a>(node: &'a AstNode<'a>, level: u8) -> Heading {
    let mut content = decode_inlines(node);
    let mut id = None;
    if let Some(Inline::String(last)) = content.last_mut() {
        if let Some((mut annotation, start)) = attrs::trailing(last) {
            last.truncate(start);
            id = annotation.remove("id");
            if !annotation.is_empty() {
                tracing::warn!(
                    target: TARGET,
                    keys = ?annotation.keys().collect::<Vec<_>>(),
                    "heading attributes other than id, dropped"
                );
            }
        }
    }
    Heading {
        id,
        depth: level,
        content: merge_strings(content),
    }
}

fn decode_list<'a>(node: &'a AstNode<'a>, list_type: ListType) -> List {
    let order = match list_type {
        ListType::Ordered => ListOrder::Ascending,
        ListType::Bullet => ListOrder::Unordered,
    };
    let items = node
        .children()
        .map(|item| {
            let mut content = decode_blocks_of(item);
            let is_checked = take_task_marker(&mut content);
            ListItem {
                id: None,
                content,
                is_checked,
            }
        })
        .collect();
    List::new(order, items)
}

/// Strip a leading `[ ] ` or `[x] ` from an item's first paragraph
fn take_task_marker(content: &mut [Block]) -> Option<bool> {
    let Some(Block::Paragraph(paragraph)) = content.first_mut() else {
        return None;
    };
    let Some(Inline::String(text)) = paragraph.content.first_mut() else {
        return None;
    };
    let (checked, rest) = if let Some(rest) = text.strip_prefix("[ ] ") {
        (false, rest)
    } else if let Some(rest) = text
        .strip_prefix("[x] ")
        .or_else(|| text.strip_prefix("[X] "))
    {
        (true, rest)
    } else {
        return None;
    };
    *text = rest.to_string();
    paragraph.content = merge_strings(std::mem::take(&mut paragraph.content));
    Some(checked)
}

fn decode_code_block(info: &str, literal: &str) -> CodeBlock {
    let (lang, mut meta) = attrs::split_info(info);
    let id = meta.remove("id");
    let lang = lang.or_else(|| meta.remove("lang"));
    CodeBlock {
        id,
        text: literal.strip_suffix('\n').unwrap_or(literal).to_string(),
        programming_language: lang,
        meta,
    }
}

fn decode_table<'a>(node: &'a AstNode<'a>) -> Table {
    let rows = node
        .children()
        .map(|row| {
            let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            TableRow {
                cells: row
                    .children()
                    .map(|cell| TableCell::new(decode_inlines(cell)))
                    .collect(),
                row_type: header.then_some(TableRowType::Header),
            }
        })
        .collect();
    Table {
        rows,
        ..Default::default()
    }
}

/// A flattened inline child: merged text, raw HTML, or any other comrak node
enum Piece<'a> {
    Text(String),
    Html(String),
    Node(&'a AstNode<'a>),
}

fn pieces<'a>(node: &'a AstNode<'a>) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    for child in node.children() {
        let text = match &child.data.borrow().value {
            NodeValue::Text(text) => text.clone(),
            NodeValue::SoftBreak | NodeValue::LineBreak => " ".to_string(),
            NodeValue::Escaped => escaped_text(child),
            NodeValue::HtmlInline(html) => {
                pieces.push(Piece::Html(html.clone()));
                continue;
            }
            _ => {
                pieces.push(Piece::Node(child));
                continue;
            }
        };
        match pieces.last_mut() {
            Some(Piece::Text(previous)) => previous.push_str(&text),
            _ => pieces.push(Piece::Text(text)),
        }
    }
    pieces
}

/// The character of a backslash escape; an escaped `!` is marked so it never starts an extension
fn escaped_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        if let NodeValue::Text(literal) = &child.data.borrow().value {
            text.push_str(literal);
        }
    }
    if text == "!" {
        extensions::ESCAPED_BANG.to_string()
    } else {
        text
    }
}

fn decode_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Inline> {
    coerce_inlines(decode_inline_nodes(node))
}

fn decode_inline_nodes<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    decode_pieces(pieces(node))
}

fn decode_pieces(mut pieces: Vec<Piece<'_>>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut index = 0;
    while index < pieces.len() {
        index = match &pieces[index] {
            Piece::Text(text) => {
                let text = text.clone();
                decode_text(&text, &mut pieces, index, &mut out)
            }
            Piece::Html(html) => {
                let html = html.clone();
                decode_html(&html, &mut pieces, index, &mut out)
            }
            Piece::Node(node) => {
                let mut inline = decode_inline_node(node);
                if let Some(Piece::Text(next)) = pieces.get_mut(index + 1) {
                    if let Some((annotation, len)) = attrs::leading(next) {
                        let annotation = annotation
                            .into_iter()
                            .map(|(key, value)| (key, extensions::unprotect(&value)))
                            .collect();
                        if apply_attrs(&mut inline, annotation) {
                            next.drain(..len);
                        }
                    }
                }
                out.push(inline);
                index + 1
            }
        };
    }
    out
}

/// Decode a text piece, returning the index of the next unconsumed piece
fn decode_text(text: &str, pieces: &mut [Piece<'_>], index: usize, out: &mut Vec<Node>) -> usize {
    let mut next = index + 1;
    let mut plain_from = 0;
    let mut scan_from = 0;

    while let Some(found) = extensions::scan(text, scan_from) {
        scan_from = found.start + 1;
        let decoded = match found.kind {
            Some(ExtensionKind::Quote) if found.content.is_none() && found.end == text.len() => {
                quote_from_link(pieces, next).map(|quote| {
                    next += 1;
                    (quote, found.end)
                })
            }
            Some(kind) if !kind.is_block() => inline_extension(kind, &found),
            None if found.content.is_some() => {
                tracing::warn!(
                    target: TARGET,
                    name = found.name,
                    "unknown inline extension, kept as text"
                );
                None
            }
            _ => None,
        };
        if let Some((node, end)) = decoded {
            push_text(out, &text[plain_from..found.start]);
            out.push(node);
            plain_from = end;
            scan_from = end;
        }
    }
    push_text(out, &text[plain_from..]);
    next
}

/// `!quote` directly followed by a link: the link text is the quote, its URL the citation
fn quote_from_link(pieces: &mut [Piece<'_>], index: usize) -> Option<Node> {
    let Some(Piece::Node(link)) = pieces.get(index) else {
        return None;
    };
    let url = match &link.data.borrow().value {
        NodeValue::Link(link) => link.url.clone(),
        _ => return None,
    };
    let content = decode_inlines(link);
    if let Some(Piece::Text(next)) = pieces.get_mut(index + 1) {
        if let Some((_, len)) = attrs::leading(next) {
            next.drain(..len);
        }
    }
    Some(Node::Quote(Quote {
        cite: Some(url).filter(|url| !url.is_empty()),
        content,
    }))
}

/// Node for an inline extension, with the end of the text it consumed
fn inline_extension(kind: ExtensionKind, found: &Scanned<'_>) -> Option<(Node, usize)> {
    let name_end = found.start + 1 + found.name.len();
    let content = found.content.map(extensions::unprotect);
    let node = match kind {
        ExtensionKind::Null => return Some((Node::Null, name_end)),
        ExtensionKind::True => return Some((Node::Boolean(true), name_end)),
        ExtensionKind::False => return Some((Node::Boolean(false), name_end)),
        _ if content.is_none() => return None,
        ExtensionKind::Boolean => match content.as_deref()?.trim() {
            "true" => Some(Node::Boolean(true)),
            "false" => Some(Node::Boolean(false)),
            _ => None,
        },
        ExtensionKind::Number => parse_number(content.as_deref()?),
        ExtensionKind::Array => serde_json::from_str::<Node>(&format!("[{}]", content.as_deref()?))
            .ok()
            .filter(|node| matches!(node, Node::Array(_))),
        ExtensionKind::Object => serde_json::from_str::<Node>(&format!("{{{}}}", content.as_deref()?))
            .ok()
            .filter(|node| matches!(node, Node::Object(_))),
        ExtensionKind::Quote => Some(Node::Quote(Quote {
            cite: found
                .argument
                .filter(|cite| !cite.is_empty())
                .map(extensions::unprotect),
            content: vec![Inline::from(content?)],
        })),
        ExtensionKind::Expr => Some(Node::CodeExpression(CodeExpression {
            text: content?,
            programming_language: found
                .properties
                .as_ref()
                .and_then(|props| props.get("lang").map(|lang| extensions::unprotect(lang))),
            output: None,
        })),
        ExtensionKind::Chunk | ExtensionKind::Figure | ExtensionKind::Include => None,
    };
    if node.is_none() {
        tracing::warn!(
            target: TARGET,
            name = found.name,
            "malformed inline extension, kept as text"
        );
    }
    node.map(|node| (node, found.end))
}

fn parse_number(text: &str) -> Option<Node> {
    let text = text.trim();
    text.parse::<i64>()
        .map(Node::Integer)
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(Node::Number))
}

fn push_text(out: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        out.push(Node::String(extensions::unprotect(text)));
    }
}

/// Decode a raw HTML piece, returning the index of the next unconsumed piece
fn decode_html(html: &str, pieces: &mut Vec<Piece<'_>>, index: usize, out: &mut Vec<Node>) -> usize {
    let Some(caps) = PAIRED_OPEN.captures(html.trim()) else {
        out.extend(decode_fragment(html));
        return index + 1;
    };
    let tag = caps[1].to_string();

    let Some(close) = find_close(pieces, index, &tag) else {
        tracing::warn!(target: TARGET, tag = %tag, "unmatched inline HTML tag, dropped");
        return index + 1;
    };
    let inner: Vec<Piece<'_>> = pieces.drain(index + 1..close).collect();
    let content = coerce_inlines(decode_pieces(inner));
    let node = match tag.as_str() {
        "sub" => Node::Subscript(Mark::new(content)),
        "sup" => Node::Superscript(Mark::new(content)),
        "del" | "s" => Node::Delete(Mark::new(content)),
        "em" => Node::Emphasis(Mark::new(content)),
        "strong" => Node::Strong(Mark::new(content)),
        _ => Node::Quote(Quote {
            cite: CITE_ATTR.captures(html).map(|caps| caps[1].to_string()),
            content,
        }),
    };
    out.push(node);
    // Skip the open tag and the close tag, which now sits right after it
    index + 2
}

fn find_close(pieces: &[Piece<'_>], open: usize, tag: &str) -> Option<usize> {
    let close_tag = format!("</{tag}>");
    let mut depth = 0usize;
    for (index, piece) in pieces.iter().enumerate().skip(open) {
        let Piece::Html(html) = piece else {
            continue;
        };
        let html = html.trim();
        if PAIRED_OPEN
            .captures(html)
            .is_some_and(|caps| &caps[1] == tag)
        {
            depth += 1;
        } else if html.eq_ignore_ascii_case(&close_tag) {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

fn decode_inline_node<'a>(node: &'a AstNode<'a>) -> Node {
    match &node.data.borrow().value {
        NodeValue::Emph => Node::Emphasis(Mark::new(decode_inlines(node))),
        NodeValue::Strong => Node::Strong(Mark::new(decode_inlines(node))),
        NodeValue::Strikethrough => Node::Delete(Mark::new(decode_inlines(node))),
        NodeValue::Superscript => Node::Superscript(Mark::new(decode_inlines(node))),
        NodeValue::Code(code) => Node::CodeFragment(CodeFragment {
            text: code.literal.clone(),
            ..Default::default()
        }),
        NodeValue::Link(link) => decode_link(node, &link.url, &link.title),
        NodeValue::Image(link) => decode_image(node, &link.url, &link.title),
        NodeValue::Math(math) => Node::MathFragment(Math::tex(math.literal.clone())),
        other => {
            tracing::warn!(target: TARGET, node = ?other, "unsupported markdown inline, kept as text");
            Node::String(decode_inlines(node).to_text())
        }
    }
}

fn decode_link<'a>(node: &'a AstNode<'a>, url: &str, title: &str) -> Node {
    let content = decode_inlines(node);
    if let Some(target) = url.strip_prefix('#') {
        if content.to_text() == target {
            return Node::Cite(Cite {
                target: target.to_string(),
                content: Vec::new(),
            });
        }
    }
    Node::Link(Link {
        title: Some(title.to_string()).filter(|title| !title.is_empty()),
        ..Link::new(url, content)
    })
}

fn decode_image<'a>(node: &'a AstNode<'a>, url: &str, title: &str) -> Node {
    let extension = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit_once('.'))
        .map(|(_, ext)| ext);
    let media_type = extension.and_then(media_types::from_extension);
    if let Some(media_type) = media_type.filter(|m| m.starts_with("audio/") || m.starts_with("video/")) {
        return Node::MediaObject(MediaObject {
            id: None,
            content_url: url.to_string(),
            media_type: Some(media_type.to_string()),
        });
    }

    let alt = decode_inlines(node).to_text();
    Node::ImageObject(ImageObject {
        caption: Some(alt).filter(|alt| !alt.is_empty()),
        title: Some(title.to_string()).filter(|title| !title.is_empty()),
        ..ImageObject::new(url)
    })
}

/// Move an annotation onto the node it follows; false if the node takes none
fn apply_attrs(node: &mut Node, mut annotation: Meta) -> bool {
    match node {
        Node::CodeFragment(code) => {
            code.programming_language = annotation.remove("lang");
            code.meta = annotation;
        }
        Node::Link(link) => {
            link.id = annotation.remove("id");
            link.meta = annotation;
        }
        Node::ImageObject(image) => {
            image.id = annotation.remove("id");
            image.meta = annotation;
        }
        Node::MediaObject(media) => media.id = annotation.remove("id"),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph(markdown: &str) -> Vec<Inline> {
        match decode_blocks(markdown).into_iter().next() {
            Some(Block::Paragraph(p)) => p.content,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn primitives_from_extensions() {
        assert_eq!(
            paragraph("a !true b !number[2.5] c !null"),
            vec![
                Inline::from("a "),
                Inline::Boolean(true),
                Inline::from(" b "),
                Inline::Number(2.5),
                Inline::from(" c "),
                Inline::Null,
            ]
        );
    }

    #[test]
    fn array_extension_holds_json_body() {
        assert_eq!(
            paragraph("!array[1,2]"),
            vec![Inline::Array(vec![Node::Integer(1), Node::Integer(2)])]
        );
    }

    #[test]
    fn escaped_expression_content() {
        assert_eq!(
            paragraph(r"!expr[a\*b\*c]{lang=py}"),
            vec![Inline::CodeExpression(CodeExpression {
                text: "a*b*c".into(),
                programming_language: Some("py".into()),
                output: None,
            })]
        );
    }

    #[test]
    fn escaped_bang_is_plain_text() {
        assert_eq!(paragraph(r"\!null !null"), vec![Inline::from("!null "), Inline::Null]);
    }

    #[test]
    fn quote_takes_the_following_link() {
        assert_eq!(
            paragraph("!quote[to be](https://example.org/hamlet)"),
            vec![Inline::Quote(Quote {
                cite: Some("https://example.org/hamlet".into()),
                content: vec![Inline::from("to be")],
            })]
        );
    }

    #[test]
    fn unknown_extension_stays_text() {
        assert_eq!(paragraph("!shout[hey]"), vec![Inline::from("!shout[hey]")]);
    }

    #[test]
    fn code_annotation() {
        assert_eq!(
            paragraph("`x + 1`{lang=python}"),
            vec![Inline::CodeFragment(CodeFragment {
                text: "x + 1".into(),
                programming_language: Some("python".into()),
                meta: Meta::new(),
            })]
        );
    }

    #[test]
    fn paired_inline_html() {
        assert_eq!(
            paragraph("H<sub>2</sub>O"),
            vec![
                Inline::from("H"),
                Inline::Subscript(Mark::new(vec![Inline::from("2")])),
                Inline::from("O"),
            ]
        );
    }

    #[test]
    fn heading_annotation_sets_id() {
        let blocks = decode_blocks("## Methods {id=methods}\n");
        assert_eq!(
            blocks,
            vec![Block::Heading(Heading {
                id: Some("methods".into()),
                depth: 2,
                content: vec![Inline::from("Methods")],
            })]
        );
    }

    #[test]
    fn task_list_items() {
        let blocks = decode_blocks("- [x] done\n- [ ] todo\n- plain\n");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        let checked: Vec<_> = list.items.iter().map(|item| item.is_checked).collect();
        assert_eq!(checked, vec![Some(true), Some(false), None]);
        assert_eq!(
            list.items[0].content,
            vec![Block::paragraph(vec![Inline::from("done")])]
        );
    }

    #[test]
    fn display_math_alone_is_a_block() {
        assert_eq!(
            decode_blocks("$$E = mc^2$$\n"),
            vec![Block::MathBlock(Math::tex("E = mc^2"))]
        );
    }

    #[test]
    fn chunk_fence() {
        let markdown = "chunk: Listing 1\n:::\n\n```python\nprint(1)\n```\n\n1\n\n-----\n\n!true\n\n:::{id=c1}\n";
        let blocks = decode_blocks(markdown);
        assert_eq!(
            blocks,
            vec![Block::CodeChunk(CodeChunk {
                id: Some("c1".into()),
                label: Some("Listing 1".into()),
                text: "print(1)".into(),
                programming_language: Some("python".into()),
                outputs: vec![Node::from("1"), Node::Boolean(true)],
                ..Default::default()
            })]
        );
    }

    #[test]
    fn figure_fence_splits_caption() {
        let markdown = "figure: Figure 1\n:::\n\n![](plot.png)\n\n-----\n\nA plot.\n\n:::\n";
        let blocks = decode_blocks(markdown);
        assert_eq!(
            blocks,
            vec![Block::Figure(Figure {
                id: None,
                label: Some("Figure 1".into()),
                caption: vec![Block::paragraph(vec![Inline::from("A plot.")])],
                content: vec![Node::ImageObject(ImageObject::new("plot.png"))],
            })]
        );
    }

    #[test]
    fn leading_heading_becomes_title() {
        let article = decode_article("---\ntitle: Ignored\nkeywords: [a]\n---\n\n# Real\n\nBody\n");
        assert_eq!(article.title, Some(vec![Inline::from("Real")]));
        assert_eq!(article.keywords, vec!["a".to_string()]);
        assert_eq!(article.content, vec![Block::paragraph(vec![Inline::from("Body")])]);
    }

    #[test]
    fn front_matter_title_without_heading() {
        let article = decode_article("---\ntitle: From YAML\n---\n\nBody\n");
        assert_eq!(article.title, Some(vec![Inline::from("From YAML")]));
    }
}
