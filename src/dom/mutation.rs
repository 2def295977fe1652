//! Tree change notifications
//!
//! Mirrors the shape a `MutationObserver` delivers: batches of records, each
//! naming the parent that changed and the nodes added under it. Records are
//! tagged with their source so the pipeline can tell its own splices apart
//! from changes made by the host page.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Who caused a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MutationSource {
    /// Page scripts, user edits, anything outside the pipeline
    #[default]
    External,
    /// Annotation, removal or panel updates done by this crate
    Internal,
}

/// One child-list change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Parent whose child list changed
    pub target: NodeId,
    /// Nodes inserted under `target`
    pub added_nodes: Vec<NodeId>,
    pub source: MutationSource,
}

/// A batch of records delivered together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    pub fn new(records: Vec<MutationRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records not caused by the pipeline itself
    pub fn external(&self) -> impl Iterator<Item = &MutationRecord> {
        self.records
            .iter()
            .filter(|r| r.source == MutationSource::External)
    }
}
