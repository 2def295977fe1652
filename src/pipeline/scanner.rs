//! Document Scanner: collect annotatable text leaves
//!
//! Breadth-first walk from a root. Excluded containers (ruby, script, form
//! controls...) and the translation panel are skipped with their whole
//! subtree; every childless text node reached is returned, in the order it
//! was first dequeued.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::FuriganaConfig;
use crate::dom::{Document, NodeId};

/// Tags whose text never renders on the page
const HIDDEN_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "textarea", "select", "option",
];

/// A text leaf found by one scan pass
///
/// `text` is a snapshot; the node may change after the scan, which the
/// annotator checks before splicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUnit {
    pub node: NodeId,
    pub text: String,
}

/// What the scanner (and the mutation filter) refuses to look into
#[derive(Debug, Clone)]
pub struct ScanRules {
    excluded_tags: HashSet<String>,
    sidebar_class: String,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::from_config(&FuriganaConfig::default())
    }
}

impl ScanRules {
    pub fn from_config(config: &FuriganaConfig) -> Self {
        Self {
            excluded_tags: config
                .excluded_tags
                .iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
            sidebar_class: config.sidebar_class.clone(),
        }
    }

    /// Element with an excluded tag. Text nodes are never excluded.
    pub fn is_excluded_tag(&self, doc: &Document, id: NodeId) -> bool {
        doc.tag(id)
            .map(|tag| self.excluded_tags.contains(tag))
            .unwrap_or(false)
    }

    pub fn is_sidebar(&self, doc: &Document, id: NodeId) -> bool {
        doc.has_class(id, &self.sidebar_class)
    }

    /// Node whose subtree is never scanned
    pub fn skips(&self, doc: &Document, id: NodeId) -> bool {
        self.is_excluded_tag(doc, id) || self.is_sidebar(doc, id)
    }

    pub fn sidebar_class(&self) -> &str {
        &self.sidebar_class
    }
}

/// Collect the text leaves under `root`. Each call is a fresh pass.
pub fn scan(doc: &Document, root: NodeId, rules: &ScanRules) -> Vec<TextUnit> {
    let mut units = Vec::new();
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        if !doc.contains(node) || rules.skips(doc, node) {
            continue;
        }
        let children = doc.children(node);
        if !children.is_empty() {
            queue.extend(
                children
                    .iter()
                    .copied()
                    .filter(|&child| !rules.is_excluded_tag(doc, child)),
            );
        } else if let Some(text) = doc.text(node) {
            units.push(TextUnit {
                node,
                text: text.to_string(),
            });
        }
    }
    units
}

/// Rendered text under `root` in document order, the way a reader sees it.
///
/// Unlike [`scan`] this keeps ruby content, but drops hidden containers and
/// the translation panel.
pub fn visible_text(doc: &Document, root: NodeId, rules: &ScanRules) -> String {
    let mut out = String::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(text) = doc.text(node) {
            out.push_str(text);
            continue;
        }
        let hidden = doc
            .tag(node)
            .map(|tag| HIDDEN_TAGS.contains(&tag))
            .unwrap_or(true);
        if hidden || rules.is_sidebar(doc, node) {
            continue;
        }
        stack.extend(doc.children(node).iter().rev().copied());
    }
    out
}
