//! JATS codec integration tests

use docweave_codecs::formats::{JatsCodec, MarkdownCodec};
use docweave_codecs::{Codec, DecodeOptions, EncodeOptions, VFile};
use docweave_schema::*;
use pretty_assertions::assert_eq;

const ARTICLE: &str = include_str!("fixtures/article.jats");

fn decode(xml: &str) -> Article {
    match JatsCodec
        .decode(&VFile::text(xml), &DecodeOptions::default())
        .expect("jats should decode")
    {
        Node::Article(article) => article,
        other => panic!("expected an article, got {other:?}"),
    }
}

fn encode(article: &Article) -> String {
    JatsCodec
        .encode(&Node::Article(article.clone()), &EncodeOptions::to_format("jats"))
        .expect("jats should encode")
        .into_text()
        .expect("jats is text")
}

#[test]
fn test_front_matter() {
    let article = decode(ARTICLE);

    assert_eq!(
        article.title.as_ref().map(|title| title.to_text()).as_deref(),
        Some("Growth of E. coli in cold water")
    );
    assert_eq!(article.date_published.as_deref(), Some("2021-03-04"));
    assert_eq!(article.keywords, vec!["microbiology", "temperature"]);
    assert_eq!(
        article.description,
        Some(vec![Block::paragraph(vec![Inline::from("We grew bacteria.")])])
    );

    let Author::Person(smith) = &article.authors[0] else {
        panic!("expected a person first");
    };
    assert_eq!(smith.display_name(), "Ann Smith");
    assert_eq!(smith.affiliations[0].name.as_deref(), Some("University of Otago"));
    assert_eq!(
        article.authors[1].citation_name().as_deref(),
        Some("The Cold Water Consortium")
    );
}

#[test]
fn test_sections_flatten_to_headings() {
    let article = decode(ARTICLE);

    let headings: Vec<(u8, String, Option<String>)> = article
        .content
        .iter()
        .filter_map(|block| match block {
            Block::Heading(heading) => {
                Some((heading.depth, heading.content.to_text(), heading.id.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        headings,
        vec![
            (1, "Introduction".to_string(), Some("sec-1".to_string())),
            (2, "Background".to_string(), None),
            (1, "Results".to_string(), Some("sec-2".to_string())),
        ]
    );
}

#[test]
fn test_body_content() {
    let article = decode(ARTICLE);

    let Block::Paragraph(cited) = &article.content[1] else {
        panic!("expected a paragraph");
    };
    assert_eq!(
        cited.content[1],
        Inline::Cite(Cite {
            target: "ref-1".into(),
            content: vec![Inline::from("Jones, 2010")],
        })
    );

    let Block::Paragraph(rate) = &article.content[3] else {
        panic!("expected a paragraph");
    };
    assert_eq!(rate.content[1], Inline::MathFragment(Math::tex("r = kT")));

    let Block::Table(table) = &article.content[5] else {
        panic!("expected a table");
    };
    assert_eq!(table.label.as_deref(), Some("Table 1"));
    assert_eq!(table.rows.len(), 2);
    assert!(table.rows[0].is_header());
}

#[test]
fn test_references() {
    let article = decode(ARTICLE);

    assert_eq!(article.references.len(), 1);
    let work = &article.references[0];
    assert_eq!(work.id.as_deref(), Some("ref-1"));
    assert_eq!(work.title.as_deref(), Some("Cold growth"));
    assert_eq!(work.is_part_of.as_deref(), Some("Microbes"));
    assert_eq!(work.year(), Some("2010"));
    assert_eq!(work.page_start.as_deref(), Some("1"));
}

#[test]
fn test_fixture_round_trip_is_stable() {
    let first = decode(ARTICLE);
    let second = decode(&encode(&first));

    assert_eq!(second, first);
}

#[test]
fn test_citations_before_reference_list_carry_text() {
    let mut article = Article::new(vec![Block::paragraph(vec![
        Inline::from("As shown "),
        Inline::Cite(Cite {
            target: "jones".into(),
            content: Vec::new(),
        }),
    ])]);
    article.references = vec![CreativeWork {
        id: Some("jones".into()),
        authors: vec![Author::Person(Person::from_name("Bo Jones"))],
        date_published: Some("2010".into()),
        ..Default::default()
    }];

    let xml = encode(&article);
    assert!(
        xml.contains(r#"<xref ref-type="bibr" rid="jones">Jones, 2010</xref>"#),
        "got {xml}"
    );
}

#[test]
fn test_markdown_to_jats_and_back() {
    let markdown = "# Title\n\nSome *text*.\n";
    let Node::Article(article) = MarkdownCodec
        .decode(&VFile::text(markdown), &DecodeOptions::default())
        .expect("markdown should decode")
    else {
        panic!("expected an article");
    };

    assert_eq!(decode(&encode(&article)), article);
}

#[test]
fn test_figure_content_survives_round_trip() {
    let table = Table {
        label: Some("Table 1".into()),
        rows: vec![TableRow {
            cells: vec![TableCell::new(vec![Inline::from("x")])],
            row_type: None,
        }],
        ..Default::default()
    };
    let article = Article::new(vec![
        Block::Figure(Figure {
            id: Some("f1".into()),
            label: Some("Figure 1".into()),
            content: vec![Node::Table(table)],
            ..Default::default()
        }),
        Block::Figure(Figure {
            id: Some("f2".into()),
            label: Some("Figure 2".into()),
            content: vec![Node::from(Block::paragraph(vec![Inline::from("Drawn by hand")]))],
            ..Default::default()
        }),
    ]);

    assert_eq!(decode(&encode(&article)), article);
}
