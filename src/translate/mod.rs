//! Hover translation: payload model, page-lifetime cache, hover state machine

pub mod payload;
pub mod cache;
pub mod hover;

pub use cache::{CacheEntry, CacheKey, TranslationCache};
pub use hover::{HoverPhase, HoverState, HoverTranslator, PanelPlacement, TranslationPrefs, TranslationRequest};
pub use payload::{DictEntry, DictWord, PanelContent, Sentence, TranslationResponse};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Dictionary-extension translation endpoint
pub const TRANSLATE_ENDPOINT: &str = "https://clients5.google.com/translate_a/single";

/// Characters `encodeURIComponent` leaves alone
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Request URL for translating `text` from `source` to `target`
pub fn translate_url(source: &str, target: &str, text: &str) -> String {
    format!(
        "{}?dj=1&dt=t&dt=sp&dt=ld&dt=bd&client=dict-chrome-ex&sl={}&tl={}&q={}",
        TRANSLATE_ENDPOINT,
        utf8_percent_encode(source, URI_COMPONENT),
        utf8_percent_encode(target, URI_COMPONENT),
        utf8_percent_encode(text.trim(), URI_COMPONENT),
    )
}
