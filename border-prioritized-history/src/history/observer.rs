//! Hooks observing operations on a history.
use log::{debug, trace};

/// Receives events from a [`PrioritizedHistory`](super::PrioritizedHistory).
///
/// Events are emitted after the operation has been applied. Observers
/// cannot change the outcome of an operation.
#[allow(unused_variables)]
pub trait HistoryObserver: Send {
    /// An entry was inserted at `position`, its payload written to `slot`.
    fn on_insert(&mut self, position: usize, slot: usize) {}

    /// An entry with priority `weight` was rejected.
    fn on_reject(&mut self, weight: f32) {}

    /// The entry at `old` was moved to `new` by a priority update.
    fn on_reposition(&mut self, old: usize, new: usize) {}

    /// `n_updated` priorities were written and the table was re-sorted.
    fn on_resort(&mut self, n_updated: usize) {}

    /// Entries at `positions` were sampled.
    fn on_sample(&mut self, positions: &[usize]) {}
}

/// An observer ignoring every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl HistoryObserver for NullObserver {}

/// An observer writing events to the [`log`] facade.
///
/// Insertions, rejections and repositions go to `debug`, samples to `trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl HistoryObserver for LogObserver {
    fn on_insert(&mut self, position: usize, slot: usize) {
        debug!("Entry was inserted at {}, replaced slot {}", position, slot);
    }

    fn on_reject(&mut self, weight: f32) {
        debug!("Entry with priority {} was rejected", weight);
    }

    fn on_reposition(&mut self, old: usize, new: usize) {
        debug!("Updated entry {} moved to {}", old, new);
    }

    fn on_resort(&mut self, n_updated: usize) {
        debug!("Updated {} entries and re-sorted", n_updated);
    }

    fn on_sample(&mut self, positions: &[usize]) {
        trace!("Sampled entries: {:?}", positions);
    }
}
