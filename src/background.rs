//! Background controller: icon state and the fetch relay
//!
//! Pages report their state with `current-tab-state-change`; when the user
//! switches tabs the host asks the new tab `is-actual-enabled` and passes the
//! answer to [`BackgroundController::on_tab_activated`]. Pages cannot fetch
//! cross-origin themselves, so `fetch-json` is handed to a [`JsonFetcher`].

use crate::page::Message;

pub const ICON_ACTIVE: &str = "icon.png";
pub const ICON_INACTIVE: &str = "icon-inactive.png";

pub fn icon_path(active: bool) -> &'static str {
    if active {
        ICON_ACTIVE
    } else {
        ICON_INACTIVE
    }
}

/// The toolbar icon
pub trait IconSink {
    fn set_icon(&mut self, path: &str);
}

/// Performs `fetch-json` requests; the response goes back to the asking page
pub trait JsonFetcher {
    fn fetch_json(&mut self, url: &str);
}

pub struct BackgroundController {
    icon: Box<dyn IconSink>,
    fetcher: Box<dyn JsonFetcher>,
    active: Option<bool>,
}

impl BackgroundController {
    pub fn new(icon: Box<dyn IconSink>, fetcher: Box<dyn JsonFetcher>) -> Self {
        Self {
            icon,
            fetcher,
            active: None,
        }
    }

    /// Last state shown on the icon
    pub fn active(&self) -> Option<bool> {
        self.active
    }

    /// Returns true iff the message was meant for the background
    pub fn on_message(&mut self, message: &Message) -> bool {
        match message {
            Message::CurrentTabStateChange(enabled) => {
                self.show(*enabled);
                true
            }
            Message::FetchJson(url) => {
                log::debug!("relaying fetch of {}", url);
                self.fetcher.fetch_json(url);
                true
            }
            _ => false,
        }
    }

    /// A tab became active. `answer` is its reply to `is-actual-enabled`;
    /// `None` when the tab has no page controller (and so nothing is annotated).
    pub fn on_tab_activated(&mut self, answer: Option<bool>) {
        self.show(answer.unwrap_or(false));
    }

    /// Query to send to a newly activated tab
    pub fn tab_query() -> Message {
        Message::IsActualEnabled
    }

    fn show(&mut self, active: bool) {
        self.active = Some(active);
        self.icon.set_icon(icon_path(active));
    }
}
