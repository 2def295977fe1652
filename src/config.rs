// furicore/src/config.rs
//
// Configuration types for the annotation pipeline

use serde::{Deserialize, Serialize};

use crate::error::{FuriganaError, Result};

/// Marker class carried by every ruby element the annotator inserts
pub const ANNOTATION_CLASS: &str = "chrome-ext-furigana";

/// Marker class carried by the floating translation panel
pub const SIDEBAR_CLASS: &str = "chrome-ext-furigana-translation";

/// Class toggled on the translation panel while it is visible
pub const PANEL_SHOW_CLASS: &str = "show";

/// Tags whose subtrees are never scanned for text
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &[
    "ruby", "rt", "rp", "script", "select", "option", "textarea",
];

/// Tags removal never descends into
pub const REMOVAL_SKIPPED_TAGS: &[&str] = &["script", "select", "textarea"];

/// Pipeline configuration
///
/// The numeric defaults are empirical and kept configurable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FuriganaConfig {
    /// Kana/Han ratio below which a page is considered Chinese
    pub chinese_kana_ratio: f64,

    /// Delay between the first qualifying mutation and the coalesced rescan
    pub rescan_debounce_ms: u64,

    /// Settle delay before a hover turns into a translation request
    pub hover_settle_ms: u64,

    /// Vertical gap between the hovered token and the panel
    pub panel_offset_px: f64,

    /// Source language passed to the translation endpoint
    pub source_lang: String,

    /// Separator between sentence-level translations in the panel
    pub sentence_delimiter: String,

    /// Tags excluded from scanning
    pub excluded_tags: Vec<String>,

    /// Class marking inserted ruby elements
    pub annotation_class: String,

    /// Class marking the translation panel
    pub sidebar_class: String,
}

impl Default for FuriganaConfig {
    fn default() -> Self {
        Self {
            chinese_kana_ratio: 0.02,
            rescan_debounce_ms: 100,
            hover_settle_ms: 200,
            panel_offset_px: 2.0,
            source_lang: "ja".to_string(),
            sentence_delimiter: ", ".to_string(),
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
            annotation_class: ANNOTATION_CLASS.to_string(),
            sidebar_class: SIDEBAR_CLASS.to_string(),
        }
    }
}

impl FuriganaConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.chinese_kana_ratio.is_finite() && self.chinese_kana_ratio >= 0.0) {
            return Err(FuriganaError::InvalidSettings(format!(
                "chineseKanaRatio must be a non-negative number, got {}",
                self.chinese_kana_ratio
            )));
        }
        if self.annotation_class.is_empty() || self.sidebar_class.is_empty() {
            return Err(FuriganaError::InvalidSettings(
                "marker classes must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder: set rescan debounce
    pub fn with_rescan_debounce_ms(mut self, ms: u64) -> Self {
        self.rescan_debounce_ms = ms;
        self
    }

    /// Builder: set hover settle delay
    pub fn with_hover_settle_ms(mut self, ms: u64) -> Self {
        self.hover_settle_ms = ms;
        self
    }

    /// Builder: set Chinese classification threshold
    pub fn with_chinese_kana_ratio(mut self, ratio: f64) -> Self {
        self.chinese_kana_ratio = ratio;
        self
    }

    /// Whether `tag` (any case) is excluded from scanning
    pub fn is_excluded_tag(&self, tag: &str) -> bool {
        self.excluded_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
