//! MutationCoalescer: one debounced rescan instead of one per mutation
//!
//! # States
//! `Idle` → `ScanScheduled { due_at }` on the first qualifying batch; back to
//! `Idle` when [`MutationCoalescer::poll`] fires. Batches arriving while a scan
//! is scheduled are dropped, so at most one rescan runs per debounce window.
//!
//! A batch qualifies when annotation is enabled, no pass is running, and it
//! adds (from outside the pipeline) a node that is not an excluded element
//! and whose parent is neither excluded nor the translation panel.

use serde::{Deserialize, Serialize};

use crate::dom::{Document, MutationBatch};
use crate::pipeline::scanner::ScanRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CoalescerState {
    #[default]
    Idle,
    ScanScheduled {
        due_at: u64,
    },
}

/// Counters for debugging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoalescerStats {
    /// Batches that armed a rescan
    pub armed: u64,
    /// Qualifying batches dropped because a rescan was already scheduled
    pub absorbed: u64,
    /// Rescans fired
    pub fired: u64,
}

#[derive(Debug, Clone)]
pub struct MutationCoalescer {
    state: CoalescerState,
    debounce_ms: u64,
    in_pass: bool,
    stats: CoalescerStats,
}

impl MutationCoalescer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            state: CoalescerState::Idle,
            debounce_ms,
            in_pass: false,
            stats: CoalescerStats::default(),
        }
    }

    pub fn state(&self) -> CoalescerState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.state, CoalescerState::ScanScheduled { .. })
    }

    /// When the scheduled rescan is due, if any
    pub fn next_deadline(&self) -> Option<u64> {
        match self.state {
            CoalescerState::ScanScheduled { due_at } => Some(due_at),
            CoalescerState::Idle => None,
        }
    }

    pub fn stats(&self) -> CoalescerStats {
        self.stats
    }

    /// Feed one delivered batch. Returns true iff it armed a rescan.
    pub fn observe(
        &mut self,
        doc: &Document,
        batch: &MutationBatch,
        rules: &ScanRules,
        enabled: bool,
        now: u64,
    ) -> bool {
        let qualifying = enabled && !self.in_pass && qualifies(doc, batch, rules);
        self.arm(qualifying, enabled, now)
    }

    /// [`observe`](Self::observe) for hosts that filter batches themselves
    pub fn arm(&mut self, qualifying: bool, enabled: bool, now: u64) -> bool {
        if !enabled || self.in_pass || !qualifying {
            return false;
        }
        if self.is_scheduled() {
            self.stats.absorbed += 1;
            return false;
        }
        self.state = CoalescerState::ScanScheduled {
            due_at: now.saturating_add(self.debounce_ms),
        };
        self.stats.armed += 1;
        true
    }

    /// Returns true exactly once per armed window, when its deadline passes
    pub fn poll(&mut self, now: u64) -> bool {
        match self.state {
            CoalescerState::ScanScheduled { due_at } if now >= due_at => {
                self.state = CoalescerState::Idle;
                self.stats.fired += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop a scheduled rescan (annotation was disabled)
    pub fn cancel(&mut self) {
        self.state = CoalescerState::Idle;
    }

    /// A scan pass is running; batches seen now are the pass's own
    pub fn begin_pass(&mut self) {
        self.in_pass = true;
    }

    pub fn end_pass(&mut self) {
        self.in_pass = false;
    }

    pub fn in_pass(&self) -> bool {
        self.in_pass
    }
}

/// Does `batch` contain an externally added node worth rescanning for?
pub fn qualifies(doc: &Document, batch: &MutationBatch, rules: &ScanRules) -> bool {
    batch.external().any(|record| {
        record.added_nodes.iter().any(|&node| {
            // Gone before delivery: no parent left to filter on
            if !doc.contains(node) {
                return true;
            }
            if rules.is_excluded_tag(doc, node) {
                return false;
            }
            match doc.parent(node) {
                Some(parent) => !rules.is_excluded_tag(doc, parent) && !rules.is_sidebar(doc, parent),
                None => true,
            }
        })
    })
}
