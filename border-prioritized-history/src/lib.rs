#![warn(missing_docs)]
//! A priority-ordered replay history for reinforcement learning.
//!
//! Observations are kept in a fixed-capacity table sorted by priority. A
//! full table evicts its lowest-priority entry on insertion, and batches
//! are drawn with stratified sampling over the priority mass.
pub mod error;
pub mod history;
pub mod storage;

mod base;
pub use base::{BuildStorage, ExperienceBufferBase, ReplayBufferBase, SlotStorage, UniformSource};
pub use error::HistoryError;
pub use history::{
    HistoryBatch, HistoryObserver, IndexSnapshot, Insertion, LogObserver, NullObserver,
    OrderedPriorityIndex, PrioritizedHistory, PrioritizedHistoryConfig, SharedPrioritizedHistory,
    StratifiedSampler,
};
pub use storage::{DType, FieldSpec, FieldStorage, VecStorage};
