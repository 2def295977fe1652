//! Persisted user settings and the store they live in

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{FuriganaError, Result};
use crate::translate::TranslationPrefs;

/// Synced user settings. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub global_disabled: bool,
    pub disabled_domains: Vec<String>,
    pub translation_disabled: bool,
    pub target_lang: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_disabled: false,
            disabled_domains: Vec::new(),
            translation_disabled: false,
            target_lang: "en".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FuriganaError::InvalidSettings(e.to_string()))
    }

    /// Annotation is off for `host`, globally or for that domain
    pub fn is_disabled_for(&self, host: &str) -> bool {
        self.global_disabled || self.disabled_domains.iter().any(|d| d == host)
    }

    pub fn set_global_disabled(&mut self, disabled: bool) {
        self.global_disabled = disabled;
    }

    pub fn enable_on_domain(&mut self, domain: &str) {
        self.disabled_domains.retain(|d| d != domain);
    }

    pub fn disable_on_domain(&mut self, domain: &str) {
        if !self.disabled_domains.iter().any(|d| d == domain) {
            self.disabled_domains.push(domain.to_string());
        }
    }

    pub fn set_translation_enabled(&mut self, enabled: bool) {
        self.translation_disabled = !enabled;
    }

    pub fn set_target_lang(&mut self, lang: &str) {
        self.target_lang = lang.to_string();
    }

    pub fn translation_prefs(&self) -> TranslationPrefs {
        TranslationPrefs {
            enabled: !self.translation_disabled,
            target_lang: if self.target_lang.is_empty() {
                TranslationPrefs::default().target_lang
            } else {
                self.target_lang.clone()
            },
        }
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.global_disabled {
            self.global_disabled = v;
        }
        if let Some(v) = patch.disabled_domains {
            self.disabled_domains = v;
        }
        if let Some(v) = patch.translation_disabled {
            self.translation_disabled = v;
        }
        if let Some(v) = patch.target_lang {
            self.target_lang = v;
        }
    }
}

/// Partial update; absent fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,
}

/// Where settings are persisted. Writes are best-effort.
pub trait SettingsStore {
    fn get(&self) -> Settings;
    fn set(&mut self, patch: SettingsPatch);
}

/// In-memory store. Clones share the same settings, the way every page of a
/// profile sees the same synced storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    inner: Rc<RefCell<Settings>>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Rc::new(RefCell::new(settings)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Settings {
        self.inner.borrow().clone()
    }

    fn set(&mut self, patch: SettingsPatch) {
        self.inner.borrow_mut().apply(patch);
    }
}
