//! Script Classifier: Kana / Han detection and page language heuristics
//!
//! Decides whether a piece of text is worth annotating and whether the page
//! as a whole reads as Japanese or Chinese. Chinese pages only get their
//! stray kana annotated; Han characters there are Hanzi, not Kanji.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Patterns
// =============================================================================

/// Hiragana ぁ..ん and Katakana ァ..ン
const KANA_PATTERN: &str = r"[ぁ-んァ-ン]";

/// CJK ideographs used for per-unit relevance: radicals, Kangxi, 々 〇,
/// Hangzhou numerals, Ext-A, URO, compatibility ideographs and the SIP
/// extension blocks.
const HAN_PATTERN: &str = concat!(
    r"[\x{2E80}-\x{2E99}\x{2E9B}-\x{2EF3}\x{2F00}-\x{2FD5}",
    r"\x{3005}\x{3007}\x{3021}-\x{3029}\x{3038}-\x{303B}",
    r"\x{3400}-\x{4DB5}\x{4E00}-\x{9FCC}",
    r"\x{F900}-\x{FA6D}\x{FA70}-\x{FAD9}",
    r"\x{20000}-\x{2EBFF}]",
);

/// Han characters counted when classifying a whole page
const PAGE_HAN_PATTERN: &str = r"[\x{3400}-\x{4DBF}\x{4E00}-\x{9FEF}\x{20000}-\x{2EBFF}]";

fn kana_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(KANA_PATTERN).expect("kana pattern is valid"))
}

fn han_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HAN_PATTERN).expect("han pattern is valid"))
}

fn page_han_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PAGE_HAN_PATTERN).expect("page han pattern is valid"))
}

// =============================================================================
// Unit predicates
// =============================================================================

/// True iff `text` contains at least one hiragana or katakana character
pub fn is_kana(text: &str) -> bool {
    kana_regex().is_match(text)
}

/// True iff `text` contains at least one CJK ideograph
pub fn is_han(text: &str) -> bool {
    han_regex().is_match(text)
}

/// Kana or Han
pub fn is_japanese(text: &str) -> bool {
    is_kana(text) || is_han(text)
}

// =============================================================================
// Page classification
// =============================================================================

/// Whole-page script decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageScript {
    #[default]
    Japanese,
    Chinese,
}

/// Kana and Han counts behind a page classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScriptCounts {
    pub kana: usize,
    pub han: usize,
}

impl ScriptCounts {
    pub fn of(text: &str) -> Self {
        Self {
            kana: kana_regex().find_iter(text).count(),
            han: page_han_regex().find_iter(text).count(),
        }
    }

    /// Kana per Han character; `None` when there is no Han at all
    pub fn kana_ratio(&self) -> Option<f64> {
        if self.han == 0 {
            None
        } else {
            Some(self.kana as f64 / self.han as f64)
        }
    }
}

/// Classify a page from its declared language tag and visible body text.
///
/// A `zh*` language tag wins outright. Otherwise the page is Chinese iff it
/// has Han characters and fewer than `threshold` kana per Han character.
pub fn classify_page(lang_tag: &str, body_text: &str, threshold: f64) -> PageScript {
    if lang_tag.to_ascii_lowercase().contains("zh") {
        return PageScript::Chinese;
    }
    match ScriptCounts::of(body_text).kana_ratio() {
        Some(ratio) if ratio < threshold => PageScript::Chinese,
        _ => PageScript::Japanese,
    }
}

impl PageScript {
    /// Per-unit relevance: kana on Chinese pages, any Japanese script otherwise
    pub fn is_eligible(&self, text: &str) -> bool {
        match self {
            PageScript::Chinese => is_kana(text),
            PageScript::Japanese => is_japanese(text),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageScript::Japanese => "japanese",
            PageScript::Chinese => "chinese",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RATIO: f64 = 0.02;

    fn han(n: usize) -> String {
        "中".repeat(n)
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Kana / Han membership
    // -------------------------------------------------------------------------
    #[test]
    fn test_kana_detection() {
        assert!(is_kana("ひらがな"));
        assert!(is_kana("カタカナ"));
        assert!(is_kana("abc の def"));
        assert!(!is_kana("漢字"));
        assert!(!is_kana("plain ascii"));
        assert!(!is_kana(""));
    }

    #[test]
    fn test_han_detection() {
        assert!(is_han("漢字"));
        assert!(is_han("々"));
        assert!(is_han("\u{F900}"));
        assert!(is_han("\u{20B9F}"));
        assert!(!is_han("かな"));
        assert!(!is_han("latin"));
    }

    #[test]
    fn test_japanese_is_union() {
        assert!(is_japanese("かな"));
        assert!(is_japanese("漢"));
        assert!(!is_japanese("hello, world"));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Language tag decides first
    // -------------------------------------------------------------------------
    #[test]
    fn test_zh_tag_is_chinese() {
        assert_eq!(classify_page("zh-CN", "日本語のテキストです", RATIO), PageScript::Chinese);
        assert_eq!(classify_page("ZH-tw", "", RATIO), PageScript::Chinese);
    }

    #[test]
    fn test_japanese_text_is_japanese() {
        assert_eq!(classify_page("ja", "日本語のテキストです", RATIO), PageScript::Japanese);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Ratio threshold
    // -------------------------------------------------------------------------
    #[test]
    fn test_low_kana_ratio_is_chinese() {
        let body = format!("{}の", han(100));
        assert_eq!(classify_page("", &body, RATIO), PageScript::Chinese);
    }

    #[test]
    fn test_high_kana_ratio_is_japanese() {
        let body = format!("{}のだよ", han(100));
        assert_eq!(classify_page("", &body, RATIO), PageScript::Japanese);
    }

    #[test]
    fn test_no_han_is_japanese() {
        assert_eq!(classify_page("en", "no cjk here", RATIO), PageScript::Japanese);
        assert_eq!(classify_page("", "かなだけ", RATIO), PageScript::Japanese);
    }

    #[test]
    fn test_counts() {
        let counts = ScriptCounts::of("漢字とかな");
        assert_eq!(counts.han, 2);
        assert_eq!(counts.kana, 3);
        assert_eq!(ScriptCounts::of("abc").kana_ratio(), None);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Per-unit eligibility
    // -------------------------------------------------------------------------
    #[test]
    fn test_eligibility_on_chinese_page() {
        let page = PageScript::Chinese;
        assert!(!page.is_eligible("中文内容"));
        assert!(page.is_eligible("中文のカタカナ"));
    }

    #[test]
    fn test_eligibility_on_japanese_page() {
        let page = PageScript::Japanese;
        assert!(page.is_eligible("漢字"));
        assert!(page.is_eligible("かな"));
        assert!(!page.is_eligible("English only"));
    }
}
