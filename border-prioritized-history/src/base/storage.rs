//! Payload storage interface.
use crate::{error::Result, storage::Schema};

/// Fixed-length payload storage addressed by slot id.
///
/// The history only decides *which* slot receives a payload; where and how
/// the payload is physically kept is up to the implementor. A storage holds
/// exactly [`SlotStorage::capacity`] slots, each holding one record.
///
/// # Examples
///
/// ```ignore
/// struct Rewards(Vec<f32>);
///
/// impl SlotStorage for Rewards {
///     type Item = f32;
///     type Batch = Vec<f32>;
///
///     fn capacity(&self) -> usize {
///         self.0.len()
///     }
///
///     fn write(&mut self, slot: usize, item: f32) -> Result<()> {
///         self.0[slot] = item;
///         Ok(())
///     }
///
///     fn read(&self, slots: &[usize]) -> Result<Vec<f32>> {
///         Ok(slots.iter().map(|&s| self.0[s]).collect())
///     }
/// }
/// ```
pub trait SlotStorage {
    /// A single record written to a slot.
    type Item;

    /// Records read from a set of slots.
    type Batch;

    /// Returns the number of slots.
    fn capacity(&self) -> usize;

    /// Checks that `item` can be written to a slot.
    ///
    /// The history calls this before assigning a slot, so that a payload
    /// failing [`write`](Self::write) never leaves a priority without content.
    #[allow(unused_variables)]
    fn check(&self, item: &Self::Item) -> Result<()> {
        Ok(())
    }

    /// Writes `item` into `slot`, replacing its previous content.
    ///
    /// Implementations must validate `item` before touching the slot.
    fn write(&mut self, slot: usize, item: Self::Item) -> Result<()>;

    /// Reads the records at `slots`, preserving the order of `slots`.
    fn read(&self, slots: &[usize]) -> Result<Self::Batch>;
}

/// Storage that can be built from the configuration of a history.
pub trait BuildStorage: SlotStorage + Sized {
    /// Builds a storage with `capacity` slots laid out after `schema`.
    fn build(capacity: usize, schema: Option<&Schema>) -> Result<Self>;
}
