//! JsTokenizer: a JS analyzer (kuromoji) behind the [`Tokenizer`] trait

use js_sys::Function;
use wasm_bindgen::prelude::*;

use super::{Token, Tokenizer};
use crate::error::FuriganaError;

/// Wraps a JS `(text) => Token[]` function
pub struct JsTokenizer {
    tokenize_fn: Function,
}

impl JsTokenizer {
    pub fn new(tokenize_fn: Function) -> Self {
        Self { tokenize_fn }
    }

    /// Build from a kuromoji tokenizer object (`{ tokenize(text) }`)
    pub fn from_object(tokenizer: &JsValue) -> Result<Self, FuriganaError> {
        let method = js_sys::Reflect::get(tokenizer, &JsValue::from_str("tokenize"))
            .map_err(|e| FuriganaError::TokenizerLoad(format!("{:?}", e)))?;
        let func: Function = method
            .dyn_into()
            .map_err(|_| FuriganaError::TokenizerLoad("tokenize is not a function".into()))?;
        Ok(Self::new(func.bind(tokenizer)))
    }

    fn try_tokenize(&self, text: &str) -> Result<Vec<Token>, FuriganaError> {
        let raw = self
            .tokenize_fn
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .map_err(|e| FuriganaError::TokenizerCall(format!("{:?}", e)))?;
        if raw.is_null() || raw.is_undefined() {
            return Ok(Vec::new());
        }
        serde_wasm_bindgen::from_value(raw).map_err(|e| FuriganaError::TokenizerCall(e.to_string()))
    }
}

impl Tokenizer for JsTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        match self.try_tokenize(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                log::warn!("{}", e);
                Vec::new()
            }
        }
    }
}
