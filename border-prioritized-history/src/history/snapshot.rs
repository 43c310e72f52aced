//! Serializable copy of the state of an [`OrderedPriorityIndex`](super::OrderedPriorityIndex).
use serde::{Deserialize, Serialize};

/// The weights, slot ids and size of an index, captured together.
///
/// Persisting the table is left to the caller; restoring goes through
/// [`OrderedPriorityIndex::from_snapshot`](super::OrderedPriorityIndex::from_snapshot),
/// which rejects snapshots violating the invariants of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Number of slots.
    pub capacity: usize,

    /// Number of active entries.
    pub size: usize,

    /// Priorities, `capacity` elements.
    pub weights: Vec<f32>,

    /// Slot ids, `capacity` elements.
    pub inds: Vec<usize>,
}
