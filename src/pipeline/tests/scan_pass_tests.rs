//! Tests for full scan passes: exclusion, removal, disable mid-pass

use super::fixtures::word_list_annotator;
use crate::config::{ANNOTATION_CLASS, SIDEBAR_CLASS};
use crate::dom::{Document, NodeId};
use crate::pipeline::{annotate_document, remove_annotations, scan, ScanRules};
use crate::script::PageScript;

fn nested(doc: &mut Document, parent: NodeId, tags: &[&str]) -> NodeId {
    tags.iter().fold(parent, |at, tag| doc.append_element(at, tag))
}

// ============================================================================
// Exclusion at any depth
// ============================================================================

#[test]
fn test_excluded_subtree_never_scanned_at_any_depth() {
    let rules = ScanRules::default();
    for tag in ["script", "textarea", "select", "ruby"] {
        for depth in 0..5 {
            let mut doc = Document::new();
            let body = doc.body();
            let wrappers = vec!["div"; depth];
            let outer = nested(&mut doc, body, &wrappers);
            let excluded = doc.append_element(outer, tag);
            let inner = nested(&mut doc, excluded, &["span", "b"]);
            doc.append_text(inner, "日本語");

            assert!(
                scan(&doc, body, &rules).is_empty(),
                "<{}> at depth {} leaked text",
                tag,
                depth
            );
        }
    }
}

#[test]
fn test_annotating_leaves_excluded_text_alone() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    let textarea = doc.append_element(body, "textarea");
    let typed = doc.append_text(textarea, "日本語");
    let panel = doc.append_element(body, "div");
    doc.add_class(panel, SIDEBAR_CLASS);
    let translated = doc.append_text(panel, "東京");

    let stats = annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Japanese, || true);
    assert_eq!(stats.units_scanned, 0);
    assert_eq!(doc.text(typed), Some("日本語"));
    assert_eq!(doc.text(translated), Some("東京"));
}

#[test]
fn test_pass_stats_count_skips() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    doc.append_text(body, "東京");
    doc.append_text(body, "hello");
    doc.append_text(body, "日本");

    let stats = annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Japanese, || true);
    assert_eq!(stats.units_scanned, 3);
    assert_eq!(stats.units_annotated, 2);
    assert_eq!(stats.units_skipped, 1);
    assert_eq!(stats.spans_inserted, 2);
}

// ============================================================================
// Disable wins over an in-flight pass
// ============================================================================

#[test]
fn test_disable_during_pass_stops_remaining_splices() {
    use std::cell::Cell;

    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    for _ in 0..4 {
        let p = doc.append_element(body, "p");
        doc.append_text(p, "東京");
    }

    // Turned off after the second check
    let checks = Cell::new(0);
    let stats = annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Japanese, || {
        checks.set(checks.get() + 1);
        checks.get() <= 2
    });

    assert_eq!(stats.units_annotated, 2);
    let marked = doc.find_all(body, |d, n| d.has_class(n, ANNOTATION_CLASS));
    assert_eq!(marked.len(), 2);

    remove_annotations(&mut doc, body, ANNOTATION_CLASS);
    assert!(doc.find_all(body, |d, n| d.has_class(n, ANNOTATION_CLASS)).is_empty());
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_removal_twice_equals_once() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    let p = doc.append_element(body, "p");
    doc.append_text(p, "日本語の勉強");
    let own = doc.append_element(body, "ruby");
    doc.append_text(own, "漢");
    let rt = doc.append_element(own, "rt");
    doc.append_text(rt, "かん");

    annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Japanese, || true);
    remove_annotations(&mut doc, body, ANNOTATION_CLASS);
    let once = doc.outer_html(body);
    remove_annotations(&mut doc, body, ANNOTATION_CLASS);

    assert_eq!(doc.outer_html(body), once);
    assert!(doc.contains(own));
}

#[test]
fn test_chinese_page_only_touches_kana_text() {
    let annotator = word_list_annotator();
    let mut doc = Document::new();
    let body = doc.body();
    let hanzi = doc.append_text(body, "東京");
    doc.append_text(body, "東京です");

    let stats = annotate_document(&mut doc, body, &ScanRules::default(), &annotator, PageScript::Chinese, || true);
    assert_eq!(stats.units_annotated, 1);
    assert_eq!(doc.text(hanzi), Some("東京"));
}
