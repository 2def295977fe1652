//! HoverTranslator: hover → settle → translate → panel
//!
//! # States
//! ```text
//! Idle ──pointer_enter(annotation)──► PendingTranslation { Settling { due_at } }
//!   ▲                                     │ poll(now >= due_at), target unchanged
//!   │                                     ▼
//!   │                                 PendingTranslation { Awaiting { key } }
//!   │                                     │ complete(key, Ok), target unchanged
//!   └──────── scroll / stale ◄──────  Showing { target }
//! ```
//!
//! The recorded hover target is updated on every pointer-enter, whatever it
//! lands on; a pending translation whose target no longer matches it is
//! dropped without touching the panel. Node ids are reused once freed, so a
//! pending target must also still be an annotation with the base text it had
//! when hovered. The panel is only placed under targets with known bounds.

use serde::{Deserialize, Serialize};

use crate::config::{FuriganaConfig, PANEL_SHOW_CLASS};
use crate::dom::{Document, NodeId};
use crate::error::FuriganaError;
use crate::translate::cache::{CacheEntry, CacheKey, TranslationCache};
use crate::translate::payload::{PanelContent, TranslationResponse};
use crate::translate::translate_url;

/// The user's translation preferences, read on each hover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationPrefs {
    pub enabled: bool,
    pub target_lang: String,
}

impl Default for TranslationPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            target_lang: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum HoverPhase {
    Settling { due_at: u64 },
    Awaiting { key: CacheKey },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum HoverState {
    #[default]
    Idle,
    PendingTranslation {
        target: NodeId,
        /// Base text seen at pointer-enter
        text: String,
        phase: HoverPhase,
    },
    Showing { target: NodeId },
}

/// A translation the host has to fetch and hand back through
/// [`HoverTranslator::complete`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub key: CacheKey,
    pub source_lang: String,
    pub url: String,
}

/// Where the panel sits, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub top: f64,
    pub left: f64,
}

pub struct HoverTranslator {
    state: HoverState,
    hover_target: Option<NodeId>,
    target_lang: String,
    cache: TranslationCache,
    panel: NodeId,
    placement: Option<PanelPlacement>,
    settle_ms: u64,
    offset_px: f64,
    source_lang: String,
    delimiter: String,
    annotation_class: String,
    show_class: String,
}

impl HoverTranslator {
    /// Create the translator and append its (hidden) panel to the body
    pub fn new(doc: &mut Document, config: &FuriganaConfig) -> Self {
        doc.begin_internal();
        let body = doc.body();
        let panel = doc.append_element(body, "div");
        doc.add_class(panel, &config.sidebar_class);
        doc.end_internal();

        Self {
            state: HoverState::Idle,
            hover_target: None,
            target_lang: TranslationPrefs::default().target_lang,
            cache: TranslationCache::new(),
            panel,
            placement: None,
            settle_ms: config.hover_settle_ms,
            offset_px: config.panel_offset_px,
            source_lang: config.source_lang.clone(),
            delimiter: config.sentence_delimiter.clone(),
            annotation_class: config.annotation_class.clone(),
            show_class: PANEL_SHOW_CLASS.to_string(),
        }
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn hover_target(&self) -> Option<NodeId> {
        self.hover_target
    }

    pub fn panel(&self) -> NodeId {
        self.panel
    }

    pub fn placement(&self) -> Option<PanelPlacement> {
        self.placement
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn is_panel_shown(&self, doc: &Document) -> bool {
        doc.has_class(self.panel, &self.show_class)
    }

    /// Settle deadline, if one is running
    pub fn next_deadline(&self) -> Option<u64> {
        match self.state {
            HoverState::PendingTranslation {
                phase: HoverPhase::Settling { due_at },
                ..
            } => Some(due_at),
            _ => None,
        }
    }

    /// The pointer entered `node`
    pub fn pointer_enter(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        prefs: &TranslationPrefs,
        now: u64,
    ) {
        self.hide(doc);

        let target = self.resolve_target(doc, node);
        self.hover_target = Some(target);

        let text = match self.annotation_text(doc, target) {
            Some(text) if prefs.enabled => text.to_string(),
            _ => {
                self.state = HoverState::Idle;
                return;
            }
        };

        self.target_lang = prefs.target_lang.clone();
        self.state = HoverState::PendingTranslation {
            target,
            text,
            phase: HoverPhase::Settling {
                due_at: now.saturating_add(self.settle_ms),
            },
        };
    }

    /// Hovering a reading (or the text inside one) counts as hovering its ruby
    fn resolve_target(&self, doc: &Document, node: NodeId) -> NodeId {
        let mut target = node;
        if doc.is_text(target) {
            target = doc.parent(target).unwrap_or(target);
        }
        if doc.tag(target) == Some("rt") {
            target = doc.parent(target).unwrap_or(target);
        }
        target
    }

    /// Base text of `node` if it is one of our ruby elements
    fn annotation_text<'d>(&self, doc: &'d Document, node: NodeId) -> Option<&'d str> {
        if doc.tag(node) != Some("ruby") || !doc.has_class(node, &self.annotation_class) {
            return None;
        }
        doc.children(node).iter().find_map(|&child| doc.text(child))
    }

    /// Is the pending `target` still the node that was hovered?
    fn still_current(&self, doc: &Document, target: NodeId, text: &str) -> bool {
        self.hover_target == Some(target) && self.annotation_text(doc, target) == Some(text)
    }

    /// Forget the hover entirely; the annotated nodes are about to go away
    pub fn reset(&mut self, doc: &mut Document) {
        self.hide(doc);
        self.state = HoverState::Idle;
        self.hover_target = None;
    }

    /// Advance the settle timer. Returns a request when one must be fetched.
    pub fn poll(&mut self, doc: &mut Document, now: u64) -> Option<TranslationRequest> {
        let (target, text) = match &self.state {
            HoverState::PendingTranslation {
                target,
                text,
                phase: HoverPhase::Settling { due_at },
            } if now >= *due_at => (*target, text.clone()),
            _ => return None,
        };
        if !self.still_current(doc, target, &text) {
            log::debug!("hover moved off node {} before settling", target);
            self.state = HoverState::Idle;
            return None;
        }
        let key = CacheKey::new(&self.target_lang, &text);

        match self.cache.get(&key) {
            Some(CacheEntry::Resolved(response)) => {
                let response = response.clone();
                self.show(doc, target, &response);
                None
            }
            Some(CacheEntry::Pending) => {
                self.state = HoverState::PendingTranslation {
                    target,
                    text,
                    phase: HoverPhase::Awaiting { key },
                };
                None
            }
            None => {
                self.cache.begin(&key);
                let request = TranslationRequest {
                    url: translate_url(&self.source_lang, &key.target_lang, &key.text),
                    source_lang: self.source_lang.clone(),
                    key: key.clone(),
                };
                self.state = HoverState::PendingTranslation {
                    target,
                    text,
                    phase: HoverPhase::Awaiting { key },
                };
                Some(request)
            }
        }
    }

    /// Hand back the outcome of a request. Returns true iff the panel is now shown.
    pub fn complete(
        &mut self,
        doc: &mut Document,
        key: &CacheKey,
        result: Result<TranslationResponse, FuriganaError>,
    ) -> bool {
        let response = match result {
            Ok(response) => {
                self.cache.resolve(key.clone(), response.clone());
                Some(response)
            }
            Err(e) => {
                log::debug!("translation of {:?} failed: {}", key.text, e);
                self.cache.forget(key);
                None
            }
        };

        let (target, text) = match &self.state {
            HoverState::PendingTranslation {
                target,
                text,
                phase: HoverPhase::Awaiting { key: awaited },
            } if awaited == key => (*target, text.clone()),
            _ => return false,
        };
        if !self.still_current(doc, target, &text) {
            log::debug!("dropping stale translation for node {}", target);
            self.state = HoverState::Idle;
            return false;
        }
        match response {
            Some(response) => self.show(doc, target, &response),
            None => {
                self.state = HoverState::Idle;
                false
            }
        }
    }

    /// Scrolling hides the panel but keeps the recorded hover target
    pub fn scroll(&mut self, doc: &mut Document) {
        self.hide(doc);
        if matches!(self.state, HoverState::Showing { .. }) {
            self.state = HoverState::Idle;
        }
    }

    fn hide(&mut self, doc: &mut Document) {
        doc.remove_class(self.panel, &self.show_class);
        if matches!(self.state, HoverState::Showing { .. }) {
            self.state = HoverState::Idle;
        }
    }

    fn show(&mut self, doc: &mut Document, target: NodeId, response: &TranslationResponse) -> bool {
        let Some(rect) = doc.bounds(target) else {
            log::debug!("no bounds reported for node {}, panel not placed", target);
            self.state = HoverState::Idle;
            return false;
        };
        let Some(content) = PanelContent::from_response(response, &self.delimiter) else {
            self.state = HoverState::Idle;
            return false;
        };

        doc.begin_internal();
        doc.clear_children(self.panel);
        for (i, line) in content.lines().into_iter().enumerate() {
            if i > 0 {
                doc.append_element(self.panel, "br");
            }
            doc.append_text(self.panel, line);
        }
        doc.end_internal();

        self.placement = Some(PanelPlacement {
            top: rect.bottom() + self.offset_px,
            left: rect.left,
        });
        doc.add_class(self.panel, &self.show_class);
        self.state = HoverState::Showing { target };
        true
    }
}
