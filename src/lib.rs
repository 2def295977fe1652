//! Furicore: reading annotations for Japanese web pages
//!
//! A Rust/WASM implementation of a furigana content script: it segments page
//! text into tokens, sets a romanized reading above every Japanese token, keeps
//! the annotations in step with a mutating document and shows a translation
//! panel for the hovered token.
//!
//! # Architecture
//!
//! ## Annotation
//! - `script.rs` - Kana / Han detection and Japanese-vs-Chinese page classification
//! - `tokenizer/` - Token model, `Tokenizer` trait, kuromoji bridge and a script-run fallback
//! - `romaji.rs` - Hepburn romanization of kana readings
//! - `pipeline/` - Scanner, Annotator, Removal and the MutationCoalescer
//!
//! ## Page
//! - `dom/` - Arena document with a mutation log that tells pipeline writes apart
//! - `page/` - Settings, runtime messages, live-enable state and PageController
//! - `translate/` - Translation payloads, page-lifetime cache and the HoverTranslator
//! - `background.rs` - Icon state and fetch relay
//!
//! Every timer is a deadline checked by `poll(now_ms)`; the host supplies the clock.
//!
//! # Usage (Rust)
//! ```rust,ignore
//! let mut page = PageController::start(
//!     doc,
//!     FuriganaConfig::default(),
//!     Box::new(MemorySettingsStore::default()),
//!     "example.jp",
//!     Ok(Box::new(ScriptRunTokenizer::new())),
//!     Box::new(HepburnRomanizer::new()),
//!     Box::new(|enabled: bool| set_badge(enabled)),
//! );
//! page.flush_mutations(now);
//! let outcome = page.poll(now);
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub mod dom;
pub mod script;
pub mod tokenizer;
pub mod romaji;
pub mod pipeline;

pub mod translate;
pub mod page;
pub mod background;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::FuriganaConfig;
pub use error::{FuriganaError, Result};
pub use page::PageController;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Panic hook and console logging
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("furicore v{}", env!("CARGO_PKG_VERSION"))
}
