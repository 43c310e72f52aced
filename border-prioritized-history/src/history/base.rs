//! Prioritized history combining the index, a storage and a random source.
use super::{
    HistoryObserver, IndexSnapshot, Insertion, NullObserver, OrderedPriorityIndex,
    PrioritizedHistoryConfig, StratifiedSampler,
};
use crate::{
    base::{BuildStorage, ExperienceBufferBase, ReplayBufferBase, SlotStorage, UniformSource},
    error::{HistoryError, Result},
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

/// A batch sampled from a [`PrioritizedHistory`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBatch<B> {
    /// Sorted positions of the sampled entries, one per bucket.
    ///
    /// Pass them back to [`PrioritizedHistory::update_weight`] or
    /// [`PrioritizedHistory::update_weights`] to reprioritize the entries.
    /// They are only valid until the next mutation of the history.
    pub positions: Vec<usize>,

    /// Storage slots of the sampled entries.
    pub slots: Vec<usize>,

    /// Priorities of the sampled entries.
    pub weights: Vec<f32>,

    /// Payloads of the sampled entries, in the order of `positions`.
    pub payload: B,
}

impl<B> HistoryBatch<B> {
    /// Returns the number of sampled entries.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the batch has no entry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A fixed-capacity history keeping the highest-priority entries.
///
/// Entries are kept sorted by priority. Adding an entry to a full history
/// evicts the lowest-priority one, or is rejected if the new priority does
/// not exceed it. Batches are drawn with [`StratifiedSampler`].
///
/// Mutating methods take `&mut self`, so the borrow checker serializes
/// writers. Use [`SharedPrioritizedHistory`](super::SharedPrioritizedHistory)
/// to share a history between threads.
///
/// # Examples
///
/// ```rust
/// use border_prioritized_history::{PrioritizedHistory, VecStorage};
///
/// let mut history = PrioritizedHistory::new(VecStorage::<i32>::new(5), 42).unwrap();
/// for (v, w) in [(1, 1.0), (2, 2.0), (3, 3.0), (5, 5.0), (6, 6.0)].iter() {
///     history.add(*v, *w).unwrap();
/// }
///
/// // Full and 0.5 does not beat the minimum.
/// assert!(!history.add(0, 0.5).unwrap().is_accepted());
///
/// let batch = history.get_batch(2).unwrap();
/// assert_eq!(batch.payload.len(), 2);
/// history.update_weights(&batch.positions, &[0.1, 0.1]).unwrap();
/// ```
pub struct PrioritizedHistory<S, R = StdRng>
where
    S: SlotStorage,
    R: UniformSource,
{
    index: OrderedPriorityIndex,
    storage: S,
    rng: R,
    observer: Box<dyn HistoryObserver>,
}

impl<S> PrioritizedHistory<S, StdRng>
where
    S: SlotStorage,
{
    /// Creates an empty history over `storage`, sampling with a seeded [`StdRng`].
    pub fn new(storage: S, seed: u64) -> Result<Self> {
        let index = OrderedPriorityIndex::new(storage.capacity())?;
        Self::with_parts(index, storage, StdRng::seed_from_u64(seed))
    }
}

impl<S, R> PrioritizedHistory<S, R>
where
    S: SlotStorage,
    R: UniformSource,
{
    /// Creates a history from its parts.
    ///
    /// The index and the storage must have the same capacity. The index may
    /// be restored from a snapshot, in which case `storage` must hold the
    /// matching payloads.
    pub fn with_parts(index: OrderedPriorityIndex, storage: S, rng: R) -> Result<Self> {
        if index.capacity() != storage.capacity() {
            return Err(HistoryError::InvalidConfiguration(format!(
                "index capacity {} differs from storage capacity {}",
                index.capacity(),
                storage.capacity()
            )));
        }

        Ok(Self {
            index,
            storage,
            rng,
            observer: Box::new(NullObserver),
        })
    }

    /// Sets the observer receiving the events of this history.
    pub fn with_observer(mut self, observer: impl HistoryObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Returns the number of active entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Read-only view of the ordered index.
    pub fn index(&self) -> &OrderedPriorityIndex {
        &self.index
    }

    /// Read-only view of the storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Copies the state of the index. The storage is not included.
    pub fn snapshot(&self) -> IndexSnapshot {
        self.index.snapshot()
    }

    /// Replaces the index with one restored from `snapshot`.
    ///
    /// The payloads of the storage are kept as they are.
    pub fn restore(&mut self, snapshot: IndexSnapshot) -> Result<()> {
        if snapshot.capacity != self.capacity() {
            return Err(HistoryError::InvalidSnapshot(format!(
                "snapshot capacity {} differs from history capacity {}",
                snapshot.capacity,
                self.capacity()
            )));
        }
        self.index = OrderedPriorityIndex::from_snapshot(snapshot)?;
        Ok(())
    }

    /// Empties the history. Payloads stay in the storage but are unreachable.
    pub fn reset(&mut self) {
        self.index.reset();
    }

    /// Adds `payload` with priority `weight`.
    ///
    /// On acceptance the payload is written to the slot returned in
    /// [`Insertion::Accepted`]. On rejection the storage is left untouched.
    /// If the storage fails to write the payload, the error is returned and
    /// the index is left as it was.
    pub fn add(&mut self, payload: S::Item, weight: f32) -> Result<Insertion> {
        self.storage.check(&payload)?;

        // The index is committed only once the payload is in its slot.
        let res = self.index.plan_insert(weight)?;
        match res {
            Insertion::Accepted { position, slot } => {
                self.storage.write(slot, payload)?;
                self.index.commit_insert(position, weight);
                self.observer.on_insert(position, slot);
            }
            Insertion::Rejected => self.observer.on_reject(weight),
        }

        Ok(res)
    }

    /// Samples `n` entries with stratified sampling.
    ///
    /// Requires `0 < n <= self.len()`. Sampling does not modify the index.
    pub fn get_batch(&mut self, n: usize) -> Result<HistoryBatch<S::Batch>> {
        let positions = StratifiedSampler::sample(self.index.weights(), n, &mut self.rng)?;
        let slots = self.index.slots_at(&positions)?;
        let weights = self.index.weights_at(&positions)?;
        let payload = self.storage.read(&slots)?;
        self.observer.on_sample(&positions);

        Ok(HistoryBatch {
            positions,
            slots,
            weights,
            payload,
        })
    }

    /// Changes the priority of the entry at `position`. Returns its new position.
    pub fn update_weight(&mut self, position: usize, weight: f32) -> Result<usize> {
        let new = self.index.update_weight(position, weight)?;
        self.observer.on_reposition(position, new);
        Ok(new)
    }

    /// Changes the priorities of the entries at `positions` and re-sorts.
    pub fn update_weights(&mut self, positions: &[usize], weights: &[f32]) -> Result<()> {
        self.index.update_weights(positions, weights)?;
        self.observer.on_resort(positions.len());
        Ok(())
    }
}

impl<S, R> ExperienceBufferBase for PrioritizedHistory<S, R>
where
    S: SlotStorage,
    R: UniformSource,
{
    type Item = (S::Item, f32);

    fn push(&mut self, item: Self::Item) -> Result<Insertion> {
        let (payload, weight) = item;
        self.add(payload, weight)
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

impl<S> ReplayBufferBase for PrioritizedHistory<S, StdRng>
where
    S: BuildStorage,
{
    type Config = PrioritizedHistoryConfig;
    type Batch = HistoryBatch<S::Batch>;

    fn build(config: &Self::Config) -> Result<Self> {
        config.validate()?;
        let storage = S::build(config.capacity, config.schema.as_ref())?;
        info!(
            "Built prioritized history with capacity {}",
            config.capacity
        );
        Self::new(storage, config.seed)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.get_batch(size)
    }

    /// Writes all priorities and re-sorts once, which is cheaper than
    /// repositioning the entries one by one.
    fn update_priority(&mut self, ixs: &[usize], priorities: &[f32]) -> Result<()> {
        self.update_weights(ixs, priorities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        storage::{DType, FieldRecord, FieldSpec, FieldStorage, FieldValue},
        VecStorage,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Events(Arc<Mutex<Vec<String>>>);

    impl HistoryObserver for Events {
        fn on_insert(&mut self, position: usize, slot: usize) {
            self.0.lock().unwrap().push(format!("insert {} {}", position, slot));
        }

        fn on_reject(&mut self, weight: f32) {
            self.0.lock().unwrap().push(format!("reject {}", weight));
        }

        fn on_reposition(&mut self, old: usize, new: usize) {
            self.0.lock().unwrap().push(format!("move {} {}", old, new));
        }

        fn on_resort(&mut self, n_updated: usize) {
            self.0.lock().unwrap().push(format!("resort {}", n_updated));
        }
    }

    fn history() -> PrioritizedHistory<VecStorage<i32>> {
        let mut history = PrioritizedHistory::new(VecStorage::new(5), 42).unwrap();
        for &v in [1, 2, 3, 5, 6].iter() {
            history.add(v, v as f32).unwrap();
        }
        history
    }

    fn payloads(history: &PrioritizedHistory<VecStorage<i32>>) -> Vec<i32> {
        history.storage().read(history.index().slots()).unwrap()
    }

    #[test]
    fn test_add_writes_payload_to_slot() {
        let mut history = history();
        assert_eq!(payloads(&history), vec![6, 5, 3, 2, 1]);

        let res = history.add(25, 2.5).unwrap();
        assert_eq!(res.position(), Some(3));
        assert_eq!(payloads(&history), vec![6, 5, 3, 25, 2]);
        assert_eq!(history.index().weights(), &[6.0, 5.0, 3.0, 2.5, 2.0]);
    }

    #[test]
    fn test_rejected_add_keeps_storage() {
        let mut history = history();
        let storage = history.storage().clone();
        assert_eq!(history.add(0, 0.5).unwrap(), Insertion::Rejected);
        assert_eq!(history.storage(), &storage);
    }

    struct FailingStorage(usize);

    impl SlotStorage for FailingStorage {
        type Item = i32;
        type Batch = Vec<i32>;

        fn capacity(&self) -> usize {
            self.0
        }

        fn write(&mut self, slot: usize, _item: i32) -> Result<()> {
            Err(HistoryError::SchemaMismatch(format!(
                "slot {} is read-only",
                slot
            )))
        }

        fn read(&self, slots: &[usize]) -> Result<Vec<i32>> {
            Ok(vec![0; slots.len()])
        }
    }

    #[test]
    fn test_failed_write_leaves_index_untouched() {
        let mut history = PrioritizedHistory::new(FailingStorage(3), 42).unwrap();
        let before = history.snapshot();

        assert!(matches!(
            history.add(1, 1.0),
            Err(HistoryError::SchemaMismatch(_))
        ));
        assert_eq!(history.snapshot(), before);
        assert!(history.is_empty());

        // A full table must not lose its tail entry to a failed write.
        let index = history_index();
        let mut history = PrioritizedHistory::with_parts(
            index.clone(),
            FailingStorage(5),
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert!(history.add(25, 2.5).is_err());
        assert_eq!(history.index(), &index);
        assert_eq!(history.index().min_weight(), Some(1.0));
    }

    fn history_index() -> OrderedPriorityIndex {
        history().index().clone()
    }

    #[test]
    fn test_batch_maps_positions_to_payloads() {
        let mut history = history();
        for _ in 0..50 {
            let batch = history.get_batch(3).unwrap();
            assert_eq!(batch.len(), 3);
            for i in 0..3 {
                let p = batch.positions[i];
                assert_eq!(batch.slots[i], history.index().slot(p).unwrap());
                assert_eq!(batch.weights[i], history.index().weight(p).unwrap());
                assert_eq!(batch.payload[i] as f32, batch.weights[i]);
            }
        }
    }

    #[test]
    fn test_batch_is_read_only() {
        let mut history = history();
        history.update_weight(4, 4.0).unwrap();
        let before = history.snapshot();
        history.get_batch(5).unwrap();
        assert_eq!(history.snapshot(), before);
    }

    #[test]
    fn test_batch_size_checked() {
        let mut history = history();
        assert!(matches!(
            history.get_batch(6),
            Err(HistoryError::InvalidConfiguration(_))
        ));
        assert!(history.get_batch(0).is_err());

        let mut empty = PrioritizedHistory::new(VecStorage::<i32>::new(5), 42).unwrap();
        assert!(empty.get_batch(1).is_err());
    }

    #[test]
    fn test_update_weight_moves_payload() {
        let mut history = history();
        assert_eq!(history.update_weight(1, 7.0).unwrap(), 0);
        assert_eq!(payloads(&history), vec![5, 6, 3, 2, 1]);
        assert_eq!(history.index().weights(), &[7.0, 6.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_update_priority() {
        let mut history = history();
        history.update_priority(&[0, 4], &[0.5, 10.0]).unwrap();
        assert_eq!(payloads(&history), vec![1, 5, 3, 2, 6]);
        assert!(history.update_priority(&[5], &[1.0]).is_err());
    }

    #[test]
    fn test_observer_events() {
        let events = Events::default();
        let mut history = PrioritizedHistory::new(VecStorage::<i32>::new(2), 42)
            .unwrap()
            .with_observer(events.clone());
        history.add(1, 1.0).unwrap();
        history.add(2, 2.0).unwrap();
        history.add(0, 0.5).unwrap();
        history.update_weight(1, 3.0).unwrap();
        history.update_weights(&[0], &[0.0]).unwrap();

        assert_eq!(
            *events.0.lock().unwrap(),
            vec![
                "insert 0 0",
                "insert 0 1",
                "reject 0.5",
                "move 1 0",
                "resort 1"
            ]
        );
    }

    #[test]
    fn test_field_storage_rejects_bad_payload_before_insert() {
        let config = PrioritizedHistoryConfig::default()
            .capacity(3)
            .field("obs", FieldSpec::new(vec![2], DType::F32));
        let mut history = PrioritizedHistory::<FieldStorage>::build(&config).unwrap();

        let mut good = FieldRecord::new();
        good.insert("obs".to_string(), FieldValue::F32(vec![1.0, 2.0]));
        assert!(history.push((good, 1.0)).unwrap().is_accepted());

        let mut bad = FieldRecord::new();
        bad.insert("obs".to_string(), FieldValue::I64(vec![1, 2]));
        assert!(matches!(
            history.push((bad, 2.0)),
            Err(HistoryError::SchemaMismatch(_))
        ));
        assert_eq!(ExperienceBufferBase::len(&history), 1);

        let batch = history.batch(1).unwrap();
        assert_eq!(batch.payload["obs"], FieldValue::F32(vec![1.0, 2.0]));
    }

    #[test]
    fn test_build_checks_storage_kind() {
        let config = PrioritizedHistoryConfig::default().capacity(3);
        assert!(PrioritizedHistory::<FieldStorage>::build(&config).is_err());
        assert!(PrioritizedHistory::<VecStorage<f32>>::build(&config).is_ok());
        assert!(PrioritizedHistory::<VecStorage<f32>>::build(&config.capacity(0)).is_err());
    }

    #[test]
    fn test_with_parts_checks_capacity() {
        let index = OrderedPriorityIndex::new(3).unwrap();
        let res = PrioritizedHistory::with_parts(index, VecStorage::<i32>::new(4), fastrand::Rng::new());
        assert!(res.is_err());
    }

    #[test]
    fn test_restore() {
        let mut history = history();
        let snapshot = history.snapshot();
        history.update_weights(&[0], &[0.0]).unwrap();
        history.restore(snapshot.clone()).unwrap();
        assert_eq!(history.snapshot(), snapshot);
        assert_eq!(payloads(&history), vec![6, 5, 3, 2, 1]);

        let other = OrderedPriorityIndex::new(4).unwrap().snapshot();
        assert!(history.restore(other).is_err());

        history.reset();
        assert!(history.is_empty());
    }
}
