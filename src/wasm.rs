//! WASM bindings for a content script driving the real DOM
//!
//! The JS side owns the page: it walks nodes, splices ruby elements and
//! schedules timers. These bindings give it the decisions: page
//! classification, per-text annotation plans, the live-enable state, the
//! rescan debounce and the translation cache.
//!
//! ```javascript,ignore
//! import init, { FuriganaCore, loadTokenizer } from 'furicore';
//!
//! await init();
//! const core = new FuriganaCore({ rescanDebounceMs: 100 });
//! core.classifyPage(document.documentElement.lang, document.body.innerText);
//! core.setTokenizer(await loadTokenizer(kuromojiReady));
//! const spans = core.annotateText("日本語です"); // [{kind: "ruby", base, reading}, ...]
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::config::FuriganaConfig;
use crate::page::{LiveEnable, Message, Settings};
use crate::pipeline::{Annotator, MutationCoalescer};
use crate::romaji::{HepburnRomanizer, Romanizer};
use crate::script::{classify_page, PageScript};
use crate::tokenizer::JsTokenizer;
use crate::translate::{translate_url, CacheKey, PanelContent, TranslationResponse};

// =============================================================================
// Tokenizer loading
// =============================================================================

/// A ready analyzer, produced by [`load_tokenizer`]
#[wasm_bindgen]
pub struct TokenizerHandle {
    inner: JsTokenizer,
}

/// Wait for a promise resolving to a kuromoji-like `{ tokenize(text) }`
#[wasm_bindgen(js_name = "loadTokenizer")]
pub async fn load_tokenizer(ready: js_sys::Promise) -> Result<TokenizerHandle, JsValue> {
    let tokenizer = JsFuture::from(ready).await?;
    let inner = JsTokenizer::from_object(&tokenizer).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(TokenizerHandle { inner })
}

// =============================================================================
// FuriganaCore
// =============================================================================

#[wasm_bindgen]
pub struct FuriganaCore {
    config: FuriganaConfig,
    page_script: PageScript,
    live: LiveEnable,
    annotator: Option<Annotator>,
    coalescer: MutationCoalescer,
    romanizer: HepburnRomanizer,
    /// In-flight and settled fetches; rejected ones remove themselves
    translations: Rc<RefCell<HashMap<CacheKey, js_sys::Promise>>>,
}

#[wasm_bindgen]
impl FuriganaCore {
    /// `config` is a (partial) `FuriganaConfig`, or undefined for defaults
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<FuriganaCore, JsValue> {
        let config: FuriganaConfig = if config.is_undefined() || config.is_null() {
            FuriganaConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            coalescer: MutationCoalescer::new(config.rescan_debounce_ms),
            config,
            page_script: PageScript::Japanese,
            live: LiveEnable::Enabled,
            annotator: None,
            romanizer: HepburnRomanizer::new(),
            translations: Rc::new(RefCell::new(HashMap::new())),
        })
    }

    /// Classify once per page; returns "japanese" or "chinese"
    #[wasm_bindgen(js_name = "classifyPage")]
    pub fn js_classify_page(&mut self, lang: &str, body_text: &str) -> String {
        self.page_script = classify_page(lang, body_text, self.config.chinese_kana_ratio);
        self.page_script.as_str().to_string()
    }

    #[wasm_bindgen(js_name = "setTokenizer")]
    pub fn js_set_tokenizer(&mut self, handle: TokenizerHandle) {
        self.annotator = Some(Annotator::new(
            Box::new(handle.inner),
            Box::new(HepburnRomanizer::new()),
            self.config.annotation_class.clone(),
        ));
    }

    #[wasm_bindgen(js_name = "hasTokenizer")]
    pub fn js_has_tokenizer(&self) -> bool {
        self.annotator.is_some()
    }

    // -------------------------------------------------------------------------
    // Live enable
    // -------------------------------------------------------------------------

    /// Resolve the starting state from stored settings; returns it
    #[wasm_bindgen(js_name = "resolveInitial")]
    pub fn js_resolve_initial(&mut self, settings: JsValue, host: &str) -> Result<bool, JsValue> {
        let settings: Settings = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse settings: {}", e)))?;
        self.live = LiveEnable::resolve_initial(&settings, host);
        Ok(self.live.is_enabled())
    }

    /// Returns true if the state changed (annotate on enable, remove on disable)
    #[wasm_bindgen(js_name = "setEnabled")]
    pub fn js_set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.live.toggle(enabled).is_some();
        if changed && !enabled {
            self.coalescer.cancel();
        }
        changed
    }

    #[wasm_bindgen(js_name = "isEnabled")]
    pub fn js_is_enabled(&self) -> bool {
        self.live.is_enabled()
    }

    /// Decode a runtime message; returns the answer for queries, undefined otherwise
    #[wasm_bindgen(js_name = "handleMessage")]
    pub fn js_handle_message(&mut self, message: JsValue) -> Result<JsValue, JsValue> {
        let message: Message = serde_wasm_bindgen::from_value(message)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse message: {}", e)))?;
        Ok(match message {
            Message::SetEnabled(enabled) => JsValue::from_bool(self.js_set_enabled(enabled)),
            Message::IsEnabledOnTab | Message::IsActualEnabled => JsValue::from_bool(self.live.is_enabled()),
            _ => JsValue::UNDEFINED,
        })
    }

    // -------------------------------------------------------------------------
    // Annotation
    // -------------------------------------------------------------------------

    /// Spans to splice in place of a text node, or null to leave it alone
    #[wasm_bindgen(js_name = "annotateText")]
    pub fn js_annotate_text(&self, text: &str) -> Result<JsValue, JsValue> {
        let Some(annotator) = self.annotator.as_ref() else {
            return Ok(JsValue::NULL);
        };
        if !self.live.is_enabled() || !self.page_script.is_eligible(text) {
            return Ok(JsValue::NULL);
        }
        match annotator.plan(text) {
            Ok(spans) => serde_wasm_bindgen::to_value(&spans)
                .map_err(|e| JsValue::from_str(&format!("Failed to serialize spans: {}", e))),
            Err(_) => Ok(JsValue::NULL),
        }
    }

    pub fn romanize(&self, kana: &str) -> String {
        self.romanizer.romanize(kana)
    }

    #[wasm_bindgen(js_name = "annotationClass")]
    pub fn js_annotation_class(&self) -> String {
        self.config.annotation_class.clone()
    }

    #[wasm_bindgen(js_name = "sidebarClass")]
    pub fn js_sidebar_class(&self) -> String {
        self.config.sidebar_class.clone()
    }

    #[wasm_bindgen(js_name = "isExcludedTag")]
    pub fn js_is_excluded_tag(&self, tag: &str) -> bool {
        self.config.is_excluded_tag(tag)
    }

    // -------------------------------------------------------------------------
    // Rescan debounce
    // -------------------------------------------------------------------------

    /// A mutation batch arrived; `qualifying` is the host's filter verdict
    #[wasm_bindgen(js_name = "observeMutations")]
    pub fn js_observe_mutations(&mut self, qualifying: bool, now: f64) -> bool {
        let enabled = self.live.is_enabled();
        self.coalescer.arm(qualifying, enabled, now as u64)
    }

    /// True when the scheduled rescan should run now
    #[wasm_bindgen(js_name = "pollRescan")]
    pub fn js_poll_rescan(&mut self, now: f64) -> bool {
        self.coalescer.poll(now as u64) && self.live.is_enabled()
    }

    #[wasm_bindgen(js_name = "beginPass")]
    pub fn js_begin_pass(&mut self) {
        self.coalescer.begin_pass();
    }

    #[wasm_bindgen(js_name = "endPass")]
    pub fn js_end_pass(&mut self) {
        self.coalescer.end_pass();
    }

    #[wasm_bindgen(js_name = "nextDeadline")]
    pub fn js_next_deadline(&self) -> Option<f64> {
        self.coalescer.next_deadline().map(|t| t as f64)
    }

    // -------------------------------------------------------------------------
    // Translation
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = "hoverSettleMs")]
    pub fn js_hover_settle_ms(&self) -> f64 {
        self.config.hover_settle_ms as f64
    }

    #[wasm_bindgen(js_name = "translateUrl")]
    pub fn js_translate_url(&self, target_lang: &str, text: &str) -> String {
        translate_url(&self.config.source_lang, target_lang, text)
    }

    /// Promise for the translation of `text`; one fetch per (language, text)
    ///
    /// `fetch_json` is called with the request URL and must return a promise
    /// of the parsed body. A rejected fetch is dropped from the cache so the
    /// next hover retries.
    #[wasm_bindgen(js_name = "translate")]
    pub fn js_translate(
        &mut self,
        target_lang: &str,
        text: &str,
        fetch_json: &js_sys::Function,
    ) -> Result<JsValue, JsValue> {
        let key = CacheKey::new(target_lang, text);
        if let Some(pending) = self.translations.borrow().get(&key) {
            return Ok(pending.clone().into());
        }
        let url = translate_url(&self.config.source_lang, &key.target_lang, &key.text);
        let fetch = JsFuture::from(js_sys::Promise::resolve(
            &fetch_json.call1(&JsValue::NULL, &JsValue::from_str(&url))?,
        ));

        let translations = Rc::clone(&self.translations);
        let failed_key = key.clone();
        let promise = future_to_promise(async move {
            let result = fetch.await;
            if result.is_err() {
                log::debug!("translation fetch for {:?} rejected", failed_key.text);
                translations.borrow_mut().remove(&failed_key);
            }
            result
        });
        self.translations.borrow_mut().insert(key, promise.clone());
        Ok(promise.into())
    }

    /// Panel content for a response, or null when there is nothing to show
    #[wasm_bindgen(js_name = "renderTranslation")]
    pub fn js_render_translation(&self, response: JsValue) -> Result<JsValue, JsValue> {
        let response: TranslationResponse = match serde_wasm_bindgen::from_value(response) {
            Ok(response) => response,
            Err(e) => {
                log::debug!("unusable translation payload: {}", e);
                return Ok(JsValue::NULL);
            }
        };
        match PanelContent::from_response(&response, &self.config.sentence_delimiter) {
            Some(content) => serde_wasm_bindgen::to_value(&content.lines())
                .map_err(|e| JsValue::from_str(&format!("Failed to serialize panel: {}", e))),
            None => Ok(JsValue::NULL),
        }
    }
}
