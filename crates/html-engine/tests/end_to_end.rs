//! Black-box integration tests exercising the parser and selector engine
//! purely through `html_engine`'s public API, end to end.

use html_engine::selector::{parse_selector, query_selector, query_selector_all, ParseContext};
use html_engine::{parse_document, serialize_document, CompatMode, EncodingConfidence, IgnoreErrors, Utf8Decoder};

fn parse(html: &str) -> (html_engine::Tree, html_engine::NodeId) {
    let mut errors = IgnoreErrors;
    let mut decoder = Utf8Decoder;
    let (tree, doc, _) = parse_document(html.as_bytes(), EncodingConfidence::Irrelevant, &mut decoder, &mut errors);
    (tree, doc)
}

#[test]
fn simple_paragraph_round_trips_through_serializer() {
    let (tree, doc) = parse("<p>Hello HTML!</p>");
    assert_eq!(
        serialize_document(&tree, doc),
        "<html><head></head><body><p>Hello HTML!</p></body></html>"
    );
}

#[test]
fn misnested_emphasis_runs_adoption_agency() {
    let (tree, doc) = parse("<p>This is <em>very <strong>wrong</em>!</strong></p>");
    assert_eq!(
        serialize_document(&tree, doc),
        "<html><head></head><body><p>This is <em>very <strong>wrong</strong></em><strong>!</strong></p></body></html>"
    );
}

#[test]
fn legacy_doctype_triggers_quirks_mode() {
    let (tree, doc) = parse(r#"<!DOCTYPE HTML PUBLIC "-//W3O//DTD W3 HTML Strict 3.0//EN//">"#);
    let html = tree.children(doc).find(|&id| {
        matches!(
            tree.get(id),
            Some(html_engine::Node::Element { local_name, .. }) if local_name.as_str() == "html"
        )
    });
    assert!(html.is_some());
}

#[test]
fn query_selector_all_yields_nodes_in_document_order() {
    let (tree, doc) = parse("<p>text1</p><p>text2</p>");
    let ctx = ParseContext::default();
    let list = parse_selector("p", &ctx).unwrap();

    let mut all = Vec::new();
    query_selector_all(&tree, doc, CompatMode::NoQuirks, &ctx, &list, |id| all.push(id));
    let texts: Vec<String> = all.iter().map(|&id| tree.characters(id).collect()).collect();
    assert_eq!(texts, vec!["text1".to_string(), "text2".to_string()]);

    let first = query_selector(&tree, doc, CompatMode::NoQuirks, &ctx, &list).unwrap();
    assert_eq!(Some(first), all.first().copied());
}

#[test]
fn class_selector_matches_only_the_tagged_element() {
    let (tree, doc) = parse(r#"<ul><li class="x">a</li><li>b</li></ul>"#);
    let ctx = ParseContext::default();
    let list = parse_selector("li.x", &ctx).unwrap();
    let found = query_selector(&tree, doc, CompatMode::NoQuirks, &ctx, &list);
    assert!(found.is_some());
    let text: String = tree.characters(found.unwrap()).collect();
    assert_eq!(text, "a");
}
