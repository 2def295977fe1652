//! ScriptRunTokenizer: dictionary-free segmentation
//!
//! Splits text into maximal runs of one script class. Kana runs carry their
//! own reading (katakana form, as kuromoji reports pronunciations); Han runs
//! have no reading because there is no dictionary to look one up in. Good
//! enough to keep romaji on kana working when the real analyzer is missing.

use super::{Token, Tokenizer};
use crate::script::{is_han, is_kana};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunClass {
    Kana,
    Han,
    Other,
}

fn classify(ch: char) -> RunClass {
    let mut buf = [0u8; 4];
    let s = ch.encode_utf8(&mut buf);
    if is_kana(s) || ch == 'ー' {
        RunClass::Kana
    } else if is_han(s) {
        RunClass::Han
    } else {
        RunClass::Other
    }
}

/// Hiragana → katakana; other characters unchanged
pub fn to_katakana(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{3041}'..='\u{3096}' => char::from_u32(ch as u32 + 0x60).unwrap_or(ch),
            _ => ch,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRunTokenizer;

impl ScriptRunTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for ScriptRunTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut start = 0;
        let mut current: Option<RunClass> = None;

        for (idx, ch) in text.char_indices() {
            let class = classify(ch);
            match current {
                Some(prev) if prev == class => {}
                Some(prev) => {
                    tokens.push(make_token(&text[start..idx], prev));
                    start = idx;
                    current = Some(class);
                }
                None => current = Some(class),
            }
        }
        if let Some(class) = current {
            tokens.push(make_token(&text[start..], class));
        }
        tokens
    }
}

fn make_token(surface: &str, class: RunClass) -> Token {
    let pronunciation = match class {
        RunClass::Kana => Some(to_katakana(surface)),
        RunClass::Han | RunClass::Other => None,
    };
    Token {
        surface_form: surface.to_string(),
        pronunciation,
    }
}
