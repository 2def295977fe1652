//! Annotation pipeline: scan → annotate, its inverse, and mutation coalescing

pub mod scanner;
pub mod annotator;
pub mod removal;
pub mod coalescer;

#[cfg(test)]
mod tests;

pub use scanner::{scan, visible_text, ScanRules, TextUnit};
pub use annotator::{base_text, AnnotateOutcome, AnnotatedSpan, Annotator, SkipReason};
pub use removal::remove_annotations;
pub use coalescer::{qualifies, CoalescerState, CoalescerStats, MutationCoalescer};

use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::script::PageScript;

/// Outcome of one full scan + annotate pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    pub units_scanned: usize,
    pub units_annotated: usize,
    pub spans_inserted: usize,
    pub units_skipped: usize,
    pub elapsed_us: u64,
}

/// Scan `root` and annotate every eligible unit found.
///
/// `is_enabled` is re-read before each splice; once it reports false the
/// remaining units are left alone.
pub fn annotate_document(
    doc: &mut Document,
    root: NodeId,
    rules: &ScanRules,
    annotator: &Annotator,
    page: PageScript,
    is_enabled: impl Fn() -> bool,
) -> PassStats {
    let start = instant::Instant::now();
    let units = scan(doc, root, rules);
    let mut stats = PassStats {
        units_scanned: units.len(),
        ..Default::default()
    };

    for unit in &units {
        match annotator.annotate(doc, unit, page, &is_enabled) {
            AnnotateOutcome::Annotated { spans, .. } => {
                stats.units_annotated += 1;
                stats.spans_inserted += spans.len();
            }
            AnnotateOutcome::Skipped(_) => stats.units_skipped += 1,
        }
    }

    stats.elapsed_us = start.elapsed().as_micros() as u64;
    log::debug!(
        "pass: {} units, {} annotated, {} spans in {}us",
        stats.units_scanned,
        stats.units_annotated,
        stats.spans_inserted,
        stats.elapsed_us
    );
    stats
}
