//! Tests for the lossless annotate / remove round trip
//!
//! Annotating never changes the base text; removing annotations restores the
//! visible text and leaves no markers behind.

use proptest::prelude::*;

use super::fixtures::word_list_annotator;
use crate::config::ANNOTATION_CLASS;
use crate::dom::Document;
use crate::pipeline::{annotate_document, base_text, remove_annotations, AnnotateOutcome, ScanRules, TextUnit};
use crate::script::PageScript;

/// Visible text with readings excluded
fn base_content(doc: &Document, id: usize) -> String {
    let mut out = String::new();
    for node in doc.find_all(id, |d, n| d.is_text(n)) {
        let inside_rt = std::iter::successors(doc.parent(node), |&p| doc.parent(p))
            .any(|p| doc.tag(p) == Some("rt"));
        if !inside_rt {
            out.push_str(doc.text(node).unwrap_or(""));
        }
    }
    out
}

fn marker_count(doc: &Document) -> usize {
    doc.find_all(doc.root(), |d, n| d.has_class(n, ANNOTATION_CLASS)).len()
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_spans_reproduce_unit_text() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    let text = "東京で日本語を勉強する。Rust 2024!";
    let node = doc.append_text(body, text);

    let unit = TextUnit { node, text: text.to_string() };
    let AnnotateOutcome::Annotated { spans, .. } =
        annotator.annotate(&mut doc, &unit, PageScript::Japanese, || true)
    else {
        panic!("unit should be annotated");
    };
    assert_eq!(base_text(&spans), text);
    assert_eq!(base_content(&doc, body), text);
}

#[test]
fn test_remove_restores_visible_text() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    let p = doc.append_element(body, "p");
    doc.append_text(p, "日本語の勉強です");
    let li = doc.append_element(body, "li");
    doc.append_text(li, "English stays");
    let before = doc.text_content(body);

    let stats = annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Japanese, || true);
    assert_eq!(stats.units_annotated, 1);
    assert!(marker_count(&doc) > 0);

    remove_annotations(&mut doc, body, ANNOTATION_CLASS);
    assert_eq!(marker_count(&doc), 0);
    assert_eq!(doc.text_content(body), before);
}

#[test]
fn test_annotating_twice_does_not_nest() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    doc.append_text(body, "東京です");
    let rules = ScanRules::default();

    annotate_document(&mut doc, body, &rules, &annotator, PageScript::Japanese, || true);
    let once = doc.outer_html(body);
    let second = annotate_document(&mut doc, body, &rules, &annotator, PageScript::Japanese, || true);

    assert_eq!(second.units_annotated, 0);
    assert_eq!(doc.outer_html(body), once);
}

proptest! {
    #[test]
    fn prop_annotate_then_remove_is_lossless(
        text in "[あ-んア-ン日本語東京勉強a-z0-9 。、!]{1,24}"
    ) {
        let annotator = word_list_annotator();
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p");
        doc.append_text(p, &text);

        annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Japanese, || true);
        prop_assert_eq!(base_content(&doc, body), text.clone());

        remove_annotations(&mut doc, body, ANNOTATION_CLASS);
        prop_assert_eq!(doc.text_content(body), text);
        prop_assert_eq!(marker_count(&doc), 0);
    }
}
