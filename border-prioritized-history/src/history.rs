//! Prioritized history for experience replay.
//!
//! The history keeps at most `capacity` entries sorted by priority and
//! draws batches with stratified sampling.
//!
//! # Key Components
//!
//! - [`OrderedPriorityIndex`]: the sorted table of `(priority, slot)` pairs
//! - [`StratifiedSampler`]: one draw per equal-mass bucket
//! - [`PrioritizedHistory`]: the index combined with a payload storage
//! - [`SharedPrioritizedHistory`]: a history shared between threads
//! - [`HistoryObserver`]: hook receiving insert, reject and reposition events
//!
//! # Examples
//!
//! ```rust
//! use border_prioritized_history::{
//!     PrioritizedHistory, PrioritizedHistoryConfig, ReplayBufferBase, VecStorage,
//! };
//!
//! let config = PrioritizedHistoryConfig::default().capacity(1000).seed(42);
//! let mut history = PrioritizedHistory::<VecStorage<f32>>::build(&config).unwrap();
//!
//! for i in 0..100 {
//!     history.add(i as f32, (i % 7) as f32 + 1.0).unwrap();
//! }
//!
//! let batch = history.batch(32).unwrap();
//! let td_errs = vec![0.5; 32];
//! history.update_priority(&batch.positions, &td_errs).unwrap();
//! ```
mod base;
mod config;
mod index;
mod observer;
mod sampler;
mod search;
mod shared;
mod snapshot;
pub use base::{HistoryBatch, PrioritizedHistory};
pub use config::PrioritizedHistoryConfig;
pub use index::{Insertion, OrderedPriorityIndex};
pub use observer::{HistoryObserver, LogObserver, NullObserver};
pub use sampler::StratifiedSampler;
pub use shared::SharedPrioritizedHistory;
pub use snapshot::IndexSnapshot;
