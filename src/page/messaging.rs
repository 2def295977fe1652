//! Runtime messages between pages, the popup and the background controller

use serde::{Deserialize, Serialize};

use crate::error::{FuriganaError, Result};

/// `{type, content}` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum Message {
    /// A page's enabled state changed (page → background)
    CurrentTabStateChange(bool),
    /// Turn annotation on or off (popup → page)
    SetEnabled(bool),
    /// Query, answered with a bool (popup → page)
    IsEnabledOnTab,
    /// Query, answered with a bool (background → page)
    IsActualEnabled,
    /// Fetch a URL and answer with its JSON body (page → background)
    FetchJson(String),
}

impl Message {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FuriganaError::InvalidMessage(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| FuriganaError::InvalidMessage(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // Plain enum of strings and bools, always serializable
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The extension icon, told about every enabled/disabled change
pub trait BadgeNotifier {
    fn state_changed(&mut self, enabled: bool);
}

impl<F: FnMut(bool)> BadgeNotifier for F {
    fn state_changed(&mut self, enabled: bool) {
        self(enabled)
    }
}

/// Notifier that drops everything
pub struct NoopNotifier;

impl BadgeNotifier for NoopNotifier {
    fn state_changed(&mut self, _enabled: bool) {}
}
