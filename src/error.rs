//! Error types shared across the annotation pipeline.
//!
//! Most pipeline steps are deliberately infallible (a missing parent or an
//! empty tokenization is a no-op, not an error). These variants cover the
//! few places where a host hands us something we cannot use.

use thiserror::Error;

/// Errors surfaced at the crate boundary
#[derive(Debug, Error)]
pub enum FuriganaError {
    /// The morphological analyzer could not be built (dictionary missing, etc.)
    #[error("tokenizer failed to load: {0}")]
    TokenizerLoad(String),

    /// A tokenizer call failed after it was ready
    #[error("tokenizer call failed: {0}")]
    TokenizerCall(String),

    /// A runtime message could not be decoded
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Persisted settings or config could not be decoded
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Translation payload was not valid JSON
    #[error("invalid translation payload: {0}")]
    InvalidPayload(String),
}

impl From<serde_json::Error> for FuriganaError {
    fn from(e: serde_json::Error) -> Self {
        FuriganaError::InvalidSettings(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FuriganaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = FuriganaError::TokenizerLoad("dict/ not found".into());
        assert_eq!(err.to_string(), "tokenizer failed to load: dict/ not found");
    }

    #[test]
    fn test_json_error_converts_to_settings_error() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: FuriganaError = parse.unwrap_err().into();
        assert!(matches!(err, FuriganaError::InvalidSettings(_)));
    }
}
