//! Codec matching over the built-in registry

use docweave_codecs::{default_registry, handled, Codec, CodecError};
use rstest::rstest;

#[rstest]
#[case::markdown_ext("a.md", "md")]
#[case::markdown_long_ext("notes.markdown", "md")]
#[case::readme("docs/README", "md")]
#[case::jats("paper.jats", "jats")]
#[case::notebook("analysis.ipynb", "ipynb")]
#[case::html("index.html", "html")]
#[case::htm("index.htm", "html")]
#[case::pdf("out.pdf", "pdf")]
#[case::json("data.json", "json")]
#[case::yaml("data.yml", "yaml")]
#[case::text("notes.txt", "txt")]
#[case::url("https://example.org/paper.md", "http")]
fn test_matches_by_path(#[case] content: &str, #[case] expected: &str) {
    let codec = default_registry()
        .match_codec(Some(content), None, false)
        .unwrap();
    assert_eq!(codec.name(), expected);
}

#[rstest]
#[case::media_type("application/jats+xml", "jats")]
#[case::media_type_case("Text/Markdown", "md")]
#[case::ext_name("md", "md")]
#[case::codec_name("ipynb", "ipynb")]
#[case::ext_alias("yml", "yaml")]
fn test_matches_by_format(#[case] format: &str, #[case] expected: &str) {
    let codec = default_registry()
        .match_codec(None, Some(format), false)
        .unwrap();
    assert_eq!(codec.name(), expected);
}

#[test]
fn test_format_beats_path_extension() {
    let codec = default_registry()
        .match_codec(Some("article.md"), Some("application/jats+xml"), false)
        .unwrap();
    assert_eq!(codec.name(), "jats");
}

#[rstest]
#[case::jats_front("<article><front><article-meta/></front></article>", "jats")]
#[case::notebook("{\"cells\": [], \"nbformat\": 4}", "ipynb")]
#[case::markdown_heading("# Heading\n\nText", "md")]
#[case::html("<!DOCTYPE html>\n<html><body></body></html>", "html")]
#[case::json("{\"type\": \"Paragraph\"}", "json")]
fn test_sniffs_content(#[case] content: &str, #[case] expected: &str) {
    let codec = default_registry()
        .match_codec(Some(content), None, false)
        .unwrap();
    assert_eq!(codec.name(), expected);
}

#[test]
fn test_output_path_is_not_read() {
    let codec = default_registry()
        .match_codec(Some("does/not/exist/yet.html"), None, true)
        .unwrap();
    assert_eq!(codec.name(), "html");
}

#[test]
fn test_nothing_to_go_on() {
    let result = default_registry().match_codec(None, None, false);
    assert!(matches!(result, Err(CodecError::NoCodecMatch { .. })));
    assert!(!handled(None, None));
}

#[test]
fn test_unknown_format() {
    match default_registry().match_codec(None, Some("docx"), false) {
        Err(CodecError::NoCodecMatch { searched }) => assert_eq!(searched, "docx"),
        Err(other) => panic!("expected NoCodecMatch, got {other:?}"),
        Ok(codec) => panic!("expected NoCodecMatch, got {}", codec.name()),
    }
}

#[test]
fn test_scan_order() {
    assert_eq!(
        default_registry().list_codecs(),
        vec!["http", "jats", "ipynb", "md", "html", "pdf", "json", "yaml", "txt"]
    );
}
