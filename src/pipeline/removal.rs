//! Removal: strip annotations back to plain text
//!
//! Depth-first. Every ruby carrying the annotation class is replaced by its
//! base text node and the reading is dropped. Foreign ruby elements (the
//! page's own furigana) are left alone and not descended into. Running it
//! twice changes nothing the second time.

use crate::config::REMOVAL_SKIPPED_TAGS;
use crate::dom::{Document, NodeId};

/// Remove every annotation under `root`; returns how many were stripped
pub fn remove_annotations(doc: &mut Document, root: NodeId, annotation_class: &str) -> usize {
    let mut removed = 0;
    let mut stack = vec![root];

    doc.begin_internal();
    while let Some(node) = stack.pop() {
        let Some(tag) = doc.tag(node) else {
            continue;
        };
        if REMOVAL_SKIPPED_TAGS.contains(&tag) {
            continue;
        }
        if tag == "ruby" {
            if doc.has_class(node, annotation_class) && unwrap_ruby(doc, node) {
                removed += 1;
            }
            continue;
        }
        stack.extend(doc.children(node).iter().rev().copied());
    }
    doc.end_internal();

    if removed > 0 {
        log::debug!("removed {} annotations", removed);
    }
    removed
}

/// Put the ruby's base text node where the ruby was
fn unwrap_ruby(doc: &mut Document, ruby: NodeId) -> bool {
    let Some(parent) = doc.parent(ruby) else {
        return false;
    };
    let Some(base) = doc.children(ruby).iter().copied().find(|&c| doc.is_text(c)) else {
        return false;
    };
    if !doc.replace_child(parent, base, ruby) {
        return false;
    }
    doc.drop_subtree(ruby);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANNOTATION_CLASS;

    fn ruby(doc: &mut Document, parent: NodeId, base: &str, reading: &str, class: Option<&str>) -> NodeId {
        let ruby = doc.append_element(parent, "ruby");
        if let Some(class) = class {
            doc.add_class(ruby, class);
        }
        doc.append_text(ruby, base);
        let rt = doc.append_element(ruby, "rt");
        doc.append_text(rt, reading);
        ruby
    }

    #[test]
    fn test_strips_marked_ruby() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p");
        ruby(&mut doc, p, "日本", "nihon", Some(ANNOTATION_CLASS));
        doc.append_text(p, "です");

        assert_eq!(remove_annotations(&mut doc, body, ANNOTATION_CLASS), 1);
        assert_eq!(doc.outer_html(p), "<p>日本です</p>");
        assert_eq!(doc.text_content(p), "日本です");
    }

    #[test]
    fn test_foreign_ruby_untouched() {
        let mut doc = Document::new();
        let body = doc.body();
        let own = ruby(&mut doc, body, "漢字", "かんじ", None);

        assert_eq!(remove_annotations(&mut doc, body, ANNOTATION_CLASS), 0);
        assert!(doc.contains(own));
    }

    #[test]
    fn test_skips_script_blocks() {
        let mut doc = Document::new();
        let body = doc.body();
        let script = doc.append_element(body, "script");
        let inside = ruby(&mut doc, script, "日本", "nihon", Some(ANNOTATION_CLASS));

        assert_eq!(remove_annotations(&mut doc, body, ANNOTATION_CLASS), 0);
        assert!(doc.contains(inside));
    }

    #[test]
    fn test_idempotent() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append_element(body, "div");
        ruby(&mut doc, div, "東京", "toukyou", Some(ANNOTATION_CLASS));
        ruby(&mut doc, div, "大阪", "oosaka", Some(ANNOTATION_CLASS));

        assert_eq!(remove_annotations(&mut doc, body, ANNOTATION_CLASS), 2);
        let once = doc.outer_html(body);
        assert_eq!(remove_annotations(&mut doc, body, ANNOTATION_CLASS), 0);
        assert_eq!(doc.outer_html(body), once);
    }

    #[test]
    fn test_removal_mutations_are_internal() {
        let mut doc = Document::new();
        let body = doc.body();
        ruby(&mut doc, body, "日本", "nihon", Some(ANNOTATION_CLASS));
        doc.take_mutations();

        remove_annotations(&mut doc, body, ANNOTATION_CLASS);
        let batch = doc.take_mutations();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.external().count(), 0);
    }
}
