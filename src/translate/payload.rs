//! Translation endpoint payload and what the panel shows for it

use serde::{Deserialize, Serialize};

use crate::error::{FuriganaError, Result};

/// Body returned by the translation endpoint.
///
/// Only the two sections the panel renders are kept; everything else in the
/// response is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    #[serde(default)]
    pub dict: Option<Vec<DictEntry>>,
    #[serde(default)]
    pub sentences: Option<Vec<Sentence>>,
}

/// Senses grouped under one part of speech
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictEntry {
    #[serde(default)]
    pub pos: String,
    #[serde(default, alias = "entries")]
    pub entry: Vec<DictWord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictWord {
    pub word: String,
}

/// One sentence-level translation. Transliteration-only rows have no `trans`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default, alias = "translated")]
    pub trans: Option<String>,
}

impl TranslationResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FuriganaError::InvalidPayload(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| FuriganaError::InvalidPayload(e.to_string()))
    }
}

/// Rendered panel body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum PanelContent {
    /// One line per part of speech: `"noun Japan, Nippon"`
    Dictionary(Vec<String>),
    /// Sentence translations joined into one line
    Sentences(String),
}

impl PanelContent {
    /// Dictionary listing if there is one, else sentences, else nothing
    pub fn from_response(response: &TranslationResponse, delimiter: &str) -> Option<Self> {
        let dict = response.dict.as_deref().unwrap_or_default();
        if !dict.is_empty() {
            let lines = dict
                .iter()
                .map(|item| {
                    let words: Vec<&str> = item.entry.iter().map(|w| w.word.as_str()).collect();
                    format!("{} {}", item.pos, words.join(", ")).trim().to_string()
                })
                .collect();
            return Some(PanelContent::Dictionary(lines));
        }

        let sentences: Vec<&str> = response
            .sentences
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|s| s.trans.as_deref())
            .collect();
        if sentences.is_empty() {
            return None;
        }
        Some(PanelContent::Sentences(sentences.join(delimiter)))
    }

    pub fn lines(&self) -> Vec<&str> {
        match self {
            PanelContent::Dictionary(lines) => lines.iter().map(String::as_str).collect(),
            PanelContent::Sentences(text) => vec![text.as_str()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_preferred() {
        let response = TranslationResponse::from_json(
            r#"{
                "sentences": [{"trans": "Japan", "orig": "日本"}],
                "dict": [
                    {"pos": "noun", "entry": [{"word": "Japan"}, {"word": "Nippon"}]},
                    {"pos": "adjective", "entry": [{"word": "Japanese"}]}
                ],
                "src": "ja"
            }"#,
        )
        .unwrap();

        assert_eq!(
            PanelContent::from_response(&response, ", "),
            Some(PanelContent::Dictionary(vec![
                "noun Japan, Nippon".to_string(),
                "adjective Japanese".to_string(),
            ]))
        );
    }

    #[test]
    fn test_sentences_joined_with_delimiter() {
        let response = TranslationResponse::from_json(
            r#"{"sentences": [{"trans": "I study"}, {"translit": "benkyou"}, {"trans": "Japanese."}]}"#,
        )
        .unwrap();
        assert_eq!(
            PanelContent::from_response(&response, " / "),
            Some(PanelContent::Sentences("I study / Japanese.".to_string()))
        );
    }

    #[test]
    fn test_alias_field_names() {
        let response = TranslationResponse::from_json(
            r#"{"dict": [{"pos": "verb", "entries": [{"word": "eat"}]}], "sentences": [{"translated": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(
            PanelContent::from_response(&response, ", ").unwrap().lines(),
            vec!["verb eat"]
        );
    }

    #[test]
    fn test_empty_payload_renders_nothing() {
        let response = TranslationResponse::from_json(r#"{"dict": [], "src": "ja"}"#).unwrap();
        assert_eq!(PanelContent::from_response(&response, ", "), None);
    }

    #[test]
    fn test_malformed_json_is_payload_error() {
        let err = TranslationResponse::from_json("<html>").unwrap_err();
        assert!(matches!(err, FuriganaError::InvalidPayload(_)));
    }
}
