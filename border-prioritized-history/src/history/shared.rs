//! A prioritized history shared between threads behind a single lock.
use super::{HistoryBatch, IndexSnapshot, Insertion, PrioritizedHistory};
use crate::{
    base::{SlotStorage, UniformSource},
    error::{HistoryError, Result},
};
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard};

/// A [`PrioritizedHistory`] behind an exclusive lock.
///
/// Every operation holds the lock for its whole duration, so mutations
/// never interleave and samples never see a half-shifted table. Cloning
/// shares the same history.
pub struct SharedPrioritizedHistory<S, R = StdRng>
where
    S: SlotStorage,
    R: UniformSource,
{
    inner: Arc<Mutex<PrioritizedHistory<S, R>>>,
}

impl<S, R> Clone for SharedPrioritizedHistory<S, R>
where
    S: SlotStorage,
    R: UniformSource,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, R> SharedPrioritizedHistory<S, R>
where
    S: SlotStorage,
    R: UniformSource,
{
    /// Wraps `history`.
    pub fn new(history: PrioritizedHistory<S, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PrioritizedHistory<S, R>>> {
        self.inner.lock().map_err(|_| HistoryError::Poisoned)
    }

    /// Runs `f` with exclusive access to the history.
    pub fn with<T>(&self, f: impl FnOnce(&mut PrioritizedHistory<S, R>) -> T) -> Result<T> {
        let mut history = self.lock()?;
        Ok(f(&mut history))
    }

    /// See [`PrioritizedHistory::add`].
    pub fn add(&self, payload: S::Item, weight: f32) -> Result<Insertion> {
        self.lock()?.add(payload, weight)
    }

    /// See [`PrioritizedHistory::get_batch`].
    pub fn get_batch(&self, n: usize) -> Result<HistoryBatch<S::Batch>> {
        self.lock()?.get_batch(n)
    }

    /// See [`PrioritizedHistory::update_weight`].
    pub fn update_weight(&self, position: usize, weight: f32) -> Result<usize> {
        self.lock()?.update_weight(position, weight)
    }

    /// See [`PrioritizedHistory::update_weights`].
    pub fn update_weights(&self, positions: &[usize], weights: &[f32]) -> Result<()> {
        self.lock()?.update_weights(positions, weights)
    }

    /// Returns the number of active entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// See [`PrioritizedHistory::snapshot`].
    pub fn snapshot(&self) -> Result<IndexSnapshot> {
        Ok(self.lock()?.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecStorage;
    use std::thread;

    #[test]
    fn test_concurrent_writers_keep_invariants() {
        let history = PrioritizedHistory::new(VecStorage::<u32>::new(64), 42).unwrap();
        let shared = SharedPrioritizedHistory::new(history);

        let handles = (0..4u32)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..500u32 {
                        let w = ((i * 7919 + t * 104729) % 1000) as f32;
                        shared.add(t * 1000 + i, w).unwrap();
                        if i % 10 == 0 && shared.len().unwrap() >= 8 {
                            let batch = shared.get_batch(8).unwrap();
                            let ws = batch.weights.iter().map(|w| w * 0.5).collect::<Vec<_>>();
                            // Another writer may have moved the entries meanwhile,
                            // but the positions are still in range.
                            shared.update_weights(&batch.positions, &ws).unwrap();
                        }
                    }
                })
            })
            .collect::<Vec<_>>();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.len().unwrap(), 64);
        shared
            .with(|h| assert_eq!(h.index().verify(), Ok(())))
            .unwrap();
    }
}
