//! Live-enable state machine and the page state snapshot

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::page::settings::Settings;

/// Whether annotation is active on this page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LiveEnable {
    Disabled,
    Enabled,
}

/// A change of [`LiveEnable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Annotate the whole document
    Enabled,
    /// Strip every annotation, stop rescanning
    Disabled,
}

impl Transition {
    pub fn is_enabled(self) -> bool {
        self == Transition::Enabled
    }
}

impl LiveEnable {
    /// Starting state: disabled if the global flag or the page's domain says so
    pub fn resolve_initial(settings: &Settings, host: &str) -> Self {
        if settings.is_disabled_for(host) {
            LiveEnable::Disabled
        } else {
            LiveEnable::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == LiveEnable::Enabled
    }

    /// Move to `enabled`. `None` when already there.
    pub fn toggle(&mut self, enabled: bool) -> Option<Transition> {
        if self.is_enabled() == enabled {
            return None;
        }
        if enabled {
            *self = LiveEnable::Enabled;
            Some(Transition::Enabled)
        } else {
            *self = LiveEnable::Disabled;
            Some(Transition::Disabled)
        }
    }
}

/// Per-page state, as reported to hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub annotation_enabled: bool,
    pub pending_rescan: bool,
    pub current_hover_target: Option<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_from_settings() {
        let mut settings = Settings::default();
        assert_eq!(LiveEnable::resolve_initial(&settings, "example.jp"), LiveEnable::Enabled);

        settings.disable_on_domain("example.jp");
        assert_eq!(LiveEnable::resolve_initial(&settings, "example.jp"), LiveEnable::Disabled);
        assert_eq!(LiveEnable::resolve_initial(&settings, "other.jp"), LiveEnable::Enabled);

        settings.set_global_disabled(true);
        assert_eq!(LiveEnable::resolve_initial(&settings, "other.jp"), LiveEnable::Disabled);
    }

    #[test]
    fn test_toggle_reports_only_changes() {
        let mut live = LiveEnable::Enabled;
        assert_eq!(live.toggle(true), None);
        assert_eq!(live.toggle(false), Some(Transition::Disabled));
        assert!(!live.is_enabled());
        assert_eq!(live.toggle(false), None);
        assert_eq!(live.toggle(true), Some(Transition::Enabled));
    }
}
