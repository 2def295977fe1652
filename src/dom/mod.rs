//! Document: arena-backed tree the pipeline reads and rewrites
//!
//! Nodes live in a `Slab` and refer to each other by index. Structural
//! insertions are logged as [`MutationRecord`]s which the host drains with
//! [`Document::take_mutations`], the way a `MutationObserver` delivers them.
//!
//! Operations on ids that were dropped (or never existed) are no-ops. The
//! pipeline treats a vanished node as "nothing to do" rather than an error.

mod mutation;

pub use mutation::{MutationBatch, MutationRecord, MutationSource};

use serde::{Deserialize, Serialize};
use slab::Slab;

/// Index of a node in its document
pub type NodeId = usize;

// =============================================================================
// Node types
// =============================================================================

/// Client bounding box of an element, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    pub classes: Vec<String>,
    /// Layout box, when the host has reported one
    pub bounds: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }
}

// =============================================================================
// Document
// =============================================================================

pub struct Document {
    nodes: Slab<Node>,
    root: NodeId,
    body: NodeId,
    /// Value of `<html lang>`
    lang: String,
    pending: Vec<MutationRecord>,
    /// Depth of nested internal sections; records made while > 0 are Internal
    internal_depth: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// `<html><body></body></html>` with no pending mutations
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = nodes.insert(Node::new(NodeData::Element(ElementData {
            tag: "html".to_string(),
            classes: Vec::new(),
            bounds: None,
        })));
        let body = nodes.insert(Node::new(NodeData::Element(ElementData {
            tag: "body".to_string(),
            classes: Vec::new(),
            bounds: None,
        })));
        nodes[body].parent = Some(root);
        nodes[root].children.push(body);

        Self {
            nodes,
            root,
            body,
            lang: String::new(),
            pending: Vec::new(),
            internal_depth: 0,
        }
    }

    /// Same as [`Document::new`] with a declared language
    pub fn with_lang(lang: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.lang = lang.into();
        doc
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn set_lang(&mut self, lang: impl Into<String>) {
        self.lang = lang.into();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Lowercase tag of an element; `None` for text nodes
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .get(id)
            .and_then(Node::as_element)
            .map(|el| el.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(Node::as_text)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id)
            .and_then(Node::as_element)
            .map(|el| el.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.nodes
            .get(id)
            .and_then(Node::as_element)
            .and_then(|el| el.bounds)
    }

    /// Concatenated text of every text node under `id`, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(_)) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Pre-order walk under `root` (inclusive) collecting nodes matching `pred`
    pub fn find_all(&self, root: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            if pred(self, id) {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        found
    }

    // -------------------------------------------------------------------------
    // Creation and attributes
    // -------------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            bounds: None,
        })))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Text(text.to_string())))
    }

    /// Replace the data of a text node. Character data changes are not
    /// child-list mutations and are not recorded.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(data)) => {
                *data = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => {
                if !el.classes.iter().any(|c| c == class) {
                    el.classes.push(class.to_string());
                }
                true
            }
            _ => false,
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => {
                el.classes.retain(|c| c != class);
                true
            }
            _ => false,
        }
    }

    pub fn set_bounds(&mut self, id: NodeId, rect: Rect) -> bool {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => {
                el.bounds = Some(rect);
                true
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Tree surgery
    // -------------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.record(parent, vec![child]);
        true
    }

    /// Insert `node` right after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        if reference == node || !self.can_adopt(parent, node) {
            return false;
        }
        self.detach(node);
        let Some(index) = self.index_in_parent(parent, reference) else {
            return false;
        };
        self.nodes[parent].children.insert(index + 1, node);
        self.nodes[node].parent = Some(parent);
        self.record(parent, vec![node]);
        true
    }

    /// Put `new` where `old` is under `parent`; `old` becomes detached
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> bool {
        if new == old || self.parent(old) != Some(parent) || !self.can_adopt(parent, new) {
            return false;
        }
        self.detach(new);
        let Some(index) = self.index_in_parent(parent, old) else {
            return false;
        };
        self.nodes[parent].children[index] = new;
        self.nodes[new].parent = Some(parent);
        self.nodes[old].parent = None;
        self.record(parent, vec![new]);
        true
    }

    /// Detach `child` from `parent` without dropping it
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Detach `id` and free it together with its whole subtree
    pub fn drop_subtree(&mut self, id: NodeId) {
        if !self.contains(id) || id == self.root {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.try_remove(next) {
                stack.extend(node.children);
            }
        }
    }

    /// Remove every child of `id`, freeing them
    pub fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn index_in_parent(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(index) = self.index_in_parent(parent, id) {
                self.nodes[parent].children.remove(index);
            }
            self.nodes[id].parent = None;
        }
    }

    /// `parent` must be a live element and not inside `child`'s subtree
    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_element(parent) || !self.contains(child) || child == self.root {
            return false;
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return false;
            }
            cursor = self.parent(id);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Mutation log
    // -------------------------------------------------------------------------

    /// Mark subsequent mutations as caused by the pipeline. Nests.
    pub fn begin_internal(&mut self) {
        self.internal_depth += 1;
    }

    pub fn end_internal(&mut self) {
        self.internal_depth = self.internal_depth.saturating_sub(1);
    }

    pub fn is_internal(&self) -> bool {
        self.internal_depth > 0
    }

    /// Drain pending records as one batch
    pub fn take_mutations(&mut self) -> MutationBatch {
        MutationBatch::new(std::mem::take(&mut self.pending))
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.pending.is_empty()
    }

    fn record(&mut self, target: NodeId, added_nodes: Vec<NodeId>) {
        let source = if self.is_internal() {
            MutationSource::Internal
        } else {
            MutationSource::External
        };
        self.pending.push(MutationRecord {
            target,
            added_nodes,
            source,
        });
    }

    // -------------------------------------------------------------------------
    // Convenience
    // -------------------------------------------------------------------------

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Serialize `id` as markup (debugging and test assertions)
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text)) => out.push_str(&escape_html(text)),
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                if !el.classes.is_empty() {
                    out.push_str(" class=\"");
                    out.push_str(&el.classes.join(" "));
                    out.push('"');
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            None => {}
        }
    }
}

/// Escape text for inclusion in markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_shape() {
        let doc = Document::new();
        assert_eq!(doc.tag(doc.root()), Some("html"));
        assert_eq!(doc.tag(doc.body()), Some("body"));
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
        assert!(!doc.has_pending_mutations());
    }

    #[test]
    fn test_append_records_external_mutation() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "P");
        assert_eq!(doc.tag(p), Some("p"));

        let batch = doc.take_mutations();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].target, body);
        assert_eq!(batch.records[0].added_nodes, vec![p]);
        assert_eq!(batch.records[0].source, MutationSource::External);
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn test_internal_section_tags_records() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.begin_internal();
        doc.begin_internal();
        doc.append_text(body, "a");
        doc.end_internal();
        doc.append_text(body, "b");
        doc.end_internal();
        doc.append_text(body, "c");

        let sources: Vec<_> = doc.take_mutations().records.iter().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![MutationSource::Internal, MutationSource::Internal, MutationSource::External]
        );
    }

    #[test]
    fn test_replace_and_insert_after_keep_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p");
        let old = doc.append_text(p, "old");
        let tail = doc.append_text(p, "!");

        let a = doc.create_text("a");
        let b = doc.create_text("b");
        assert!(doc.replace_child(p, a, old));
        assert!(doc.insert_after(a, b));

        assert_eq!(doc.children(p), &[a, b, tail]);
        assert_eq!(doc.parent(old), None);
        assert_eq!(doc.text_content(p), "ab!");
    }

    #[test]
    fn test_replace_requires_real_parent() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p");
        let orphan = doc.create_text("x");
        let new = doc.create_text("y");
        assert!(!doc.replace_child(p, new, orphan));
        assert!(!doc.insert_after(orphan, new));
    }

    #[test]
    fn test_cannot_create_cycles() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = doc.append_element(body, "div");
        let inner = doc.append_element(outer, "div");
        assert!(!doc.append_child(inner, outer));
        assert!(!doc.append_child(outer, outer));
        assert_eq!(doc.parent(outer), Some(body));
    }

    #[test]
    fn test_text_nodes_cannot_have_children() {
        let mut doc = Document::new();
        let body = doc.body();
        let text = doc.append_text(body, "leaf");
        let other = doc.create_text("x");
        assert!(!doc.append_child(text, other));
    }

    #[test]
    fn test_drop_subtree_frees_nodes() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append_element(body, "div");
        let text = doc.append_text(div, "gone");
        let before = doc.len();

        doc.drop_subtree(div);
        assert!(!doc.contains(div));
        assert!(!doc.contains(text));
        assert_eq!(doc.len(), before - 2);
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn test_classes_and_bounds() {
        let mut doc = Document::new();
        let body = doc.body();
        let span = doc.append_element(body, "span");
        doc.add_class(span, "x");
        doc.add_class(span, "x");
        assert!(doc.has_class(span, "x"));
        doc.remove_class(span, "x");
        assert!(!doc.has_class(span, "x"));

        doc.set_bounds(span, Rect::new(10.0, 20.0, 30.0, 15.0));
        assert_eq!(doc.bounds(span).map(|r| r.bottom()), Some(35.0));
    }

    #[test]
    fn test_outer_html_escapes_text() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p");
        doc.add_class(p, "note");
        doc.append_text(p, "a < b");
        assert_eq!(doc.outer_html(p), "<p class=\"note\">a &lt; b</p>");
    }

    #[test]
    fn test_find_all_preorder() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.append_element(body, "span");
        let b = doc.append_element(a, "span");
        let c = doc.append_element(body, "span");
        let spans = doc.find_all(body, |d, id| d.tag(id) == Some("span"));
        assert_eq!(spans, vec![a, b, c]);
    }

    #[test]
    fn test_stale_ids_are_noops() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p");
        doc.drop_subtree(p);
        assert!(!doc.set_text(p, "x"));
        assert!(!doc.add_class(p, "x"));
        assert_eq!(doc.children(p), &[] as &[NodeId]);
        assert_eq!(doc.text_content(p), "");
    }
}
