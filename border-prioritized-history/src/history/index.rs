//! Capacity-bounded table of `(priority, slot)` pairs sorted by priority.
use super::{
    search::{first_less, last_greater, move_within},
    IndexSnapshot,
};
use crate::error::{HistoryError, Result};

/// Outcome of [`OrderedPriorityIndex::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The entry was placed at `position` and its payload goes to `slot`.
    ///
    /// If the table was full, `slot` previously held the evicted entry.
    Accepted {
        /// Sorted position of the new entry.
        position: usize,

        /// Storage slot assigned to the new entry.
        slot: usize,
    },

    /// The table is full and the priority does not exceed the minimum.
    Rejected,
}

impl Insertion {
    /// Returns `true` if the entry was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Sorted position of an accepted entry.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Accepted { position, .. } => Some(*position),
            Self::Rejected => None,
        }
    }

    /// Storage slot of an accepted entry.
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::Accepted { slot, .. } => Some(*slot),
            Self::Rejected => None,
        }
    }
}

/// Table of priorities and slot ids kept in non-increasing priority order.
///
/// The first [`len`](Self::len) entries of `weights` are sorted in
/// non-increasing order and `inds[i]` is the storage slot whose priority is
/// `weights[i]`. `inds` is always a permutation of `0..capacity`; its tail
/// `inds[len..]` lists the slots not used yet.
///
/// Every method validates its arguments before writing, so a failed call
/// leaves the table untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedPriorityIndex {
    capacity: usize,
    size: usize,
    weights: Vec<f32>,
    inds: Vec<usize>,
}

fn check_weight(w: f32) -> Result<()> {
    if w.is_finite() {
        Ok(())
    } else {
        Err(HistoryError::NonFiniteWeight(w))
    }
}

impl OrderedPriorityIndex {
    /// Creates an empty table with `capacity` slots.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HistoryError::InvalidConfiguration(
                "capacity must be positive".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            size: 0,
            weights: vec![0.0; capacity],
            inds: (0..capacity).collect(),
        })
    }

    /// Restores a table from a snapshot taken with [`snapshot`](Self::snapshot).
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self> {
        let IndexSnapshot {
            capacity,
            size,
            weights,
            inds,
        } = snapshot;
        let index = Self {
            capacity,
            size,
            weights,
            inds,
        };
        index.verify().map_err(HistoryError::InvalidSnapshot)?;
        Ok(index)
    }

    /// Copies the weights, slot ids and size at once.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            capacity: self.capacity,
            size: self.size,
            weights: self.weights.clone(),
            inds: self.inds.clone(),
        }
    }

    /// Re-initializes the table to the empty state.
    pub fn reset(&mut self) {
        self.size = 0;
        self.weights.iter_mut().for_each(|w| *w = 0.0);
        self.inds
            .iter_mut()
            .enumerate()
            .for_each(|(i, ix)| *ix = i);
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of active entries.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no entry has been inserted.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if every slot is in use.
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    /// Priorities of the active entries in non-increasing order.
    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.size]
    }

    /// Slot ids of the active entries, parallel to [`weights`](Self::weights).
    pub fn slots(&self) -> &[usize] {
        &self.inds[..self.size]
    }

    /// Priority at `position`.
    pub fn weight(&self, position: usize) -> Result<f32> {
        self.check_position(position)?;
        Ok(self.weights[position])
    }

    /// Slot id at `position`.
    pub fn slot(&self, position: usize) -> Result<usize> {
        self.check_position(position)?;
        Ok(self.inds[position])
    }

    /// Maps positions to slot ids, preserving order.
    pub fn slots_at(&self, positions: &[usize]) -> Result<Vec<usize>> {
        positions.iter().map(|&p| self.slot(p)).collect()
    }

    /// Priorities at the given positions, preserving order.
    pub fn weights_at(&self, positions: &[usize]) -> Result<Vec<f32>> {
        positions.iter().map(|&p| self.weight(p)).collect()
    }

    /// The lowest active priority.
    pub fn min_weight(&self) -> Option<f32> {
        self.weights().last().copied()
    }

    /// The highest active priority.
    pub fn max_weight(&self) -> Option<f32> {
        self.weights().first().copied()
    }

    /// Sum of the active priorities.
    pub fn total_weight(&self) -> f32 {
        self.weights().iter().map(|&w| w as f64).sum::<f64>() as f32
    }

    fn check_position(&self, position: usize) -> Result<()> {
        if position < self.size {
            Ok(())
        } else {
            Err(HistoryError::IndexOutOfRange {
                index: position,
                size: self.size,
            })
        }
    }

    /// Inserts a new entry with priority `weight`.
    ///
    /// The entry goes before the first entry with a strictly lower priority,
    /// so entries of equal priority are never displaced. When the table is
    /// full, the last entry is evicted and its slot is handed to the new
    /// entry; if no entry has a lower priority, the insertion is rejected.
    pub fn insert(&mut self, weight: f32) -> Result<Insertion> {
        let res = self.plan_insert(weight)?;
        if let Insertion::Accepted { position, .. } = res {
            self.commit_insert(position, weight);
        }
        Ok(res)
    }

    /// Returns what [`insert`](Self::insert) would do, without changing the
    /// table.
    ///
    /// The slot of an accepted plan can be filled first and the entry
    /// committed afterwards with [`commit_insert`](Self::commit_insert), so
    /// that a failed payload write leaves the table untouched.
    pub fn plan_insert(&self, weight: f32) -> Result<Insertion> {
        check_weight(weight)?;

        let position = first_less(self.weights(), weight);
        if position == self.size && self.is_full() {
            return Ok(Insertion::Rejected);
        }

        // When not full, inds[size] is the next unused slot.
        let slot = self.inds[self.size.min(self.capacity - 1)];
        Ok(Insertion::Accepted { position, slot })
    }

    /// Applies an accepted plan of [`plan_insert`](Self::plan_insert).
    ///
    /// `position` and `weight` must come from a plan made on the current
    /// state of the table.
    pub(crate) fn commit_insert(&mut self, position: usize, weight: f32) {
        let last = self.size.min(self.capacity - 1);
        move_within(&mut self.weights, last, position);
        move_within(&mut self.inds, last, position);
        self.weights[position] = weight;
        self.size = (self.size + 1).min(self.capacity);
    }

    /// Changes the priority of the entry at `position` and moves it to keep
    /// the order. Returns the new position.
    ///
    /// An increased priority only moves the entry toward the head, a
    /// decreased one only toward the tail. Only the entries between the old
    /// and the new position are shifted.
    pub fn update_weight(&mut self, position: usize, weight: f32) -> Result<usize> {
        self.check_position(position)?;
        check_weight(weight)?;

        let old = self.weights[position];
        let target = if weight > old {
            first_less(&self.weights[..position], weight)
        } else if weight < old {
            match last_greater(&self.weights[position + 1..self.size], weight) {
                Some(k) => position + 1 + k,
                None => position,
            }
        } else {
            position
        };

        move_within(&mut self.weights[..self.size], position, target);
        move_within(&mut self.inds[..self.size], position, target);
        self.weights[target] = weight;

        Ok(target)
    }

    /// Writes priorities at the given positions, then re-sorts the active
    /// range.
    ///
    /// The sort is stable: entries with equal priority keep their relative
    /// order. If a position appears more than once, the last value wins.
    pub fn update_weights(&mut self, positions: &[usize], weights: &[f32]) -> Result<()> {
        if positions.len() != weights.len() {
            return Err(HistoryError::LengthMismatch {
                positions: positions.len(),
                weights: weights.len(),
            });
        }
        for &p in positions.iter() {
            self.check_position(p)?;
        }
        for &w in weights.iter() {
            check_weight(w)?;
        }

        for (&p, &w) in positions.iter().zip(weights.iter()) {
            self.weights[p] = w;
        }

        let mut pairs = self.weights[..self.size]
            .iter()
            .copied()
            .zip(self.inds[..self.size].iter().copied())
            .collect::<Vec<_>>();
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (i, (w, ix)) in pairs.into_iter().enumerate() {
            self.weights[i] = w;
            self.inds[i] = ix;
        }

        Ok(())
    }

    /// Checks the invariants of the table.
    pub(crate) fn verify(&self) -> std::result::Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be positive".to_string());
        }
        if self.size > self.capacity {
            return Err(format!(
                "size {} exceeds capacity {}",
                self.size, self.capacity
            ));
        }
        if self.weights.len() != self.capacity || self.inds.len() != self.capacity {
            return Err(format!(
                "expected {} weights and slot ids, got {} and {}",
                self.capacity,
                self.weights.len(),
                self.inds.len()
            ));
        }
        if let Some(w) = self.weights().iter().find(|w| !w.is_finite()) {
            return Err(format!("non-finite priority {}", w));
        }
        if self.weights().windows(2).any(|w| w[0] < w[1]) {
            return Err("priorities are not in non-increasing order".to_string());
        }
        if self.weights[self.size..].iter().any(|&w| w != 0.0) {
            return Err("unused priorities must be zero".to_string());
        }

        let mut seen = vec![false; self.capacity];
        for &ix in self.inds.iter() {
            if ix >= self.capacity || seen[ix] {
                return Err(format!("slot ids are not a permutation (slot {})", ix));
            }
            seen[ix] = true;
        }

        Ok(())
    }
}
