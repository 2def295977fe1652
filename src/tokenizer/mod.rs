// furicore/src/tokenizer/mod.rs
//
// Tokenizer adapter: the morphological analyzer is consumed as a capability.
// Dictionary segmentation itself lives outside this crate (kuromoji in the
// browser); what matters here is the Token shape and the contiguity contract.

mod script_run;
#[cfg(target_arch = "wasm32")]
mod js;

pub use script_run::ScriptRunTokenizer;
#[cfg(target_arch = "wasm32")]
pub use js::JsTokenizer;

use serde::{Deserialize, Serialize};

/// One segment of analyzed text
///
/// Field names follow kuromoji's output so JS tokens deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(alias = "surfaceForm")]
    pub surface_form: String,
    /// Katakana reading; absent or `"*"` for unknown words
    #[serde(default)]
    pub pronunciation: Option<String>,
}

impl Token {
    pub fn new(surface_form: impl Into<String>, pronunciation: Option<&str>) -> Self {
        Self {
            surface_form: surface_form.into(),
            pronunciation: pronunciation.map(str::to_string),
        }
    }

    /// Pronunciation, or empty when absent
    pub fn pronunciation_str(&self) -> &str {
        self.pronunciation.as_deref().unwrap_or("")
    }
}

/// Morphological analyzer capability
///
/// Tokens must partition `text`: concatenating every `surface_form` in order
/// reproduces the input exactly.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for std::rc::Rc<T> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

/// True iff the surfaces of `tokens` concatenate to `text`
pub fn reconstructs(text: &str, tokens: &[Token]) -> bool {
    let mut rest = text;
    for token in tokens {
        match rest.strip_prefix(token.surface_form.as_str()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    rest.is_empty()
}
