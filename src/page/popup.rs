//! Popup commands: settings edits and per-tab toggles

use serde::{Deserialize, Serialize};

use crate::error::{FuriganaError, Result};
use crate::page::messaging::Message;
use crate::page::settings::{Settings, SettingsPatch, SettingsStore};

/// What the popup can ask for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum PopupCommand {
    SetGlobalDisabled(bool),
    EnableOnDomain(String),
    DisableOnDomain(String),
    EnableOnCurrentTab,
    DisableOnCurrentTab,
    SetEnableTranslation(bool),
    SetTargetLang(String),
}

impl PopupCommand {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FuriganaError::InvalidMessage(e.to_string()))
    }

    /// Persist the command. Tab toggles are not persisted; they come back as
    /// the message to send to the active tab.
    pub fn apply(self, store: &mut dyn SettingsStore) -> Option<Message> {
        let mut settings = store.get();
        let patch = match self {
            PopupCommand::SetGlobalDisabled(disabled) => SettingsPatch {
                global_disabled: Some(disabled),
                ..Default::default()
            },
            PopupCommand::EnableOnDomain(domain) => {
                settings.enable_on_domain(&domain);
                SettingsPatch {
                    disabled_domains: Some(settings.disabled_domains),
                    ..Default::default()
                }
            }
            PopupCommand::DisableOnDomain(domain) => {
                settings.disable_on_domain(&domain);
                SettingsPatch {
                    disabled_domains: Some(settings.disabled_domains),
                    ..Default::default()
                }
            }
            PopupCommand::SetEnableTranslation(enabled) => SettingsPatch {
                translation_disabled: Some(!enabled),
                ..Default::default()
            },
            PopupCommand::SetTargetLang(lang) => SettingsPatch {
                target_lang: Some(lang),
                ..Default::default()
            },
            PopupCommand::EnableOnCurrentTab => return Some(Message::SetEnabled(true)),
            PopupCommand::DisableOnCurrentTab => return Some(Message::SetEnabled(false)),
        };
        store.set(patch);
        None
    }
}

/// Everything the popup renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupState {
    pub domain: String,
    pub global_disabled: bool,
    pub disabled_domains: Vec<String>,
    pub current_tab_enabled: bool,
    pub translation_disabled: bool,
    pub target_lang: String,
}

impl PopupState {
    /// `current_tab_enabled` is the tab's answer to `is-enabled-on-tab`
    pub fn new(domain: &str, settings: Settings, current_tab_enabled: bool) -> Self {
        Self {
            domain: domain.to_string(),
            global_disabled: settings.global_disabled,
            disabled_domains: settings.disabled_domains,
            current_tab_enabled,
            translation_disabled: settings.translation_disabled,
            target_lang: settings.target_lang,
        }
    }
}
