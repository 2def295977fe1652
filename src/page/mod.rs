//! PageController: one annotated page
//!
//! Owns the document, the live-enable state, the coalescer and the hover
//! translator, and wires them together the way a content script does:
//!
//! 1. `start` classifies the page, resolves the initial state from settings,
//!    tells the badge, and runs the first pass when enabled.
//! 2. Messages toggle the state (pass on enable, removal on disable) or are
//!    answered synchronously.
//! 3. Mutation batches arm the coalescer; `poll` runs due rescans and hover
//!    deadlines.
//!
//! A tokenizer that failed to load leaves the controller inert: it still
//! answers queries but never annotates.

pub mod settings;
pub mod messaging;
pub mod state;
pub mod popup;

pub use messaging::{BadgeNotifier, Message, NoopNotifier};
pub use popup::{PopupCommand, PopupState};
pub use settings::{MemorySettingsStore, Settings, SettingsPatch, SettingsStore};
pub use state::{LiveEnable, PageState, Transition};

use serde::{Deserialize, Serialize};

use crate::config::FuriganaConfig;
use crate::dom::{Document, MutationBatch, NodeId};
use crate::error::FuriganaError;
use crate::pipeline::{
    annotate_document, remove_annotations, visible_text, Annotator, MutationCoalescer, PassStats, ScanRules,
};
use crate::romaji::Romanizer;
use crate::script::{classify_page, PageScript};
use crate::tokenizer::Tokenizer;
use crate::translate::{CacheKey, HoverTranslator, TranslationRequest, TranslationResponse};

/// What a `poll` produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome {
    /// Stats of the rescan that ran, if one was due
    pub pass: Option<PassStats>,
    /// Translation the host must fetch
    pub request: Option<TranslationRequest>,
}

pub struct PageController {
    doc: Document,
    config: FuriganaConfig,
    rules: ScanRules,
    page_script: PageScript,
    live: LiveEnable,
    /// `None` when the tokenizer never became ready
    annotator: Option<Annotator>,
    coalescer: MutationCoalescer,
    hover: HoverTranslator,
    store: Box<dyn SettingsStore>,
    notifier: Box<dyn BadgeNotifier>,
    last_pass: Option<PassStats>,
}

impl PageController {
    /// Bring a loaded page up.
    ///
    /// `tokenizer` is the outcome of waiting for the analyzer; an error is
    /// logged and the page simply stays unannotated.
    pub fn start(
        mut doc: Document,
        config: FuriganaConfig,
        store: Box<dyn SettingsStore>,
        host: &str,
        tokenizer: Result<Box<dyn Tokenizer>, FuriganaError>,
        romanizer: Box<dyn Romanizer>,
        notifier: Box<dyn BadgeNotifier>,
    ) -> Self {
        let rules = ScanRules::from_config(&config);
        let body_text = visible_text(&doc, doc.body(), &rules);
        let page_script = classify_page(doc.lang(), &body_text, config.chinese_kana_ratio);
        log::info!("page {} classified as {}", host, page_script.as_str());

        let live = LiveEnable::resolve_initial(&store.get(), host);
        let hover = HoverTranslator::new(&mut doc, &config);
        // Content present at load is covered by the first pass
        doc.take_mutations();

        let annotator = match tokenizer {
            Ok(tokenizer) => Some(Annotator::new(tokenizer, romanizer, config.annotation_class.clone())),
            Err(e) => {
                log::warn!("annotation unavailable: {}", e);
                None
            }
        };

        let mut controller = Self {
            rules,
            coalescer: MutationCoalescer::new(config.rescan_debounce_ms),
            doc,
            config,
            page_script,
            live,
            annotator,
            hover,
            store,
            notifier,
            last_pass: None,
        };

        if controller.annotator.is_some() {
            controller.notifier.state_changed(live.is_enabled());
            if live.is_enabled() {
                controller.rescan();
            }
        }
        controller
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The live tree, for hosts mirroring page changes into it
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_script(&self) -> PageScript {
        self.page_script
    }

    pub fn is_enabled(&self) -> bool {
        self.live.is_enabled()
    }

    /// False when the tokenizer failed to load
    pub fn can_annotate(&self) -> bool {
        self.annotator.is_some()
    }

    pub fn config(&self) -> &FuriganaConfig {
        &self.config
    }

    pub fn hover(&self) -> &HoverTranslator {
        &self.hover
    }

    pub fn coalescer(&self) -> &MutationCoalescer {
        &self.coalescer
    }

    pub fn last_pass(&self) -> Option<&PassStats> {
        self.last_pass.as_ref()
    }

    pub fn state(&self) -> PageState {
        PageState {
            annotation_enabled: self.live.is_enabled(),
            pending_rescan: self.coalescer.is_scheduled(),
            current_hover_target: self.hover.hover_target(),
        }
    }

    /// Earliest pending deadline; the host should `poll` no later than this
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.coalescer.next_deadline(), self.hover.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -------------------------------------------------------------------------
    // Enable / disable
    // -------------------------------------------------------------------------

    /// Handle a runtime message. Queries return their answer.
    pub fn handle_message(&mut self, message: Message) -> Option<bool> {
        match message {
            Message::SetEnabled(enabled) => {
                self.set_enabled(enabled);
                None
            }
            Message::IsEnabledOnTab | Message::IsActualEnabled => Some(self.live.is_enabled()),
            other => {
                log::debug!("page ignores {:?}", other);
                None
            }
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        let Some(transition) = self.live.toggle(enabled) else {
            return;
        };
        self.notifier.state_changed(transition.is_enabled());
        match transition {
            Transition::Enabled => {
                self.rescan();
            }
            Transition::Disabled => {
                self.coalescer.cancel();
                // Removal frees every annotated ruby
                self.hover.reset(&mut self.doc);
                let body = self.doc.body();
                remove_annotations(&mut self.doc, body, &self.config.annotation_class);
            }
        }
    }

    /// Full scan + annotate pass over the body. No-op while disabled or
    /// without a tokenizer.
    pub fn rescan(&mut self) -> Option<PassStats> {
        let annotator = self.annotator.as_ref()?;
        if !self.live.is_enabled() {
            return None;
        }
        let body = self.doc.body();

        self.coalescer.begin_pass();
        let live = &self.live;
        let stats = annotate_document(
            &mut self.doc,
            body,
            &self.rules,
            annotator,
            self.page_script,
            || live.is_enabled(),
        );
        self.coalescer.end_pass();

        self.last_pass = Some(stats.clone());
        Some(stats)
    }

    // -------------------------------------------------------------------------
    // Mutations and timers
    // -------------------------------------------------------------------------

    /// Feed a batch delivered by the tree observer
    pub fn on_mutations(&mut self, batch: &MutationBatch, now: u64) -> bool {
        let enabled = self.live.is_enabled() && self.annotator.is_some();
        self.coalescer
            .observe(&self.doc, batch, &self.rules, enabled, now)
    }

    /// Drain the document's own pending records and feed them
    pub fn flush_mutations(&mut self, now: u64) -> bool {
        let batch = self.doc.take_mutations();
        if batch.is_empty() {
            return false;
        }
        self.on_mutations(&batch, now)
    }

    /// Run whatever is due at `now`
    pub fn poll(&mut self, now: u64) -> PollOutcome {
        let pass = if self.coalescer.poll(now) {
            self.rescan()
        } else {
            None
        };
        let request = self.hover.poll(&mut self.doc, now);
        PollOutcome { pass, request }
    }

    // -------------------------------------------------------------------------
    // Hover translation
    // -------------------------------------------------------------------------

    /// Pointer entered `node`; translation preferences are read fresh
    pub fn pointer_enter(&mut self, node: NodeId, now: u64) {
        let prefs = self.store.get().translation_prefs();
        self.hover.pointer_enter(&mut self.doc, node, &prefs, now);
    }

    pub fn scroll(&mut self) {
        self.hover.scroll(&mut self.doc);
    }

    /// Result of a request handed out by `poll`. Returns true if the panel shows.
    pub fn complete_translation(
        &mut self,
        key: &CacheKey,
        result: Result<TranslationResponse, FuriganaError>,
    ) -> bool {
        self.hover.complete(&mut self.doc, key, result)
    }
}
