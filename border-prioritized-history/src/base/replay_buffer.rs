//! Replay buffer interface for reinforcement learning.
//!
//! Replay buffers store experiences pushed by environment-facing processes
//! and hand out batches of them to trainers. Pushing and batching are kept
//! in separate traits so that a process can own one side only.
use crate::{error::Result, Insertion};

/// Interface for buffers that store prioritized experiences.
///
/// # Examples
///
/// ```ignore
/// let accepted = history.push((payload, td_err.abs()))?.is_accepted();
/// ```
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer, paired with their priority.
    type Item;

    /// Pushes a new experience into the buffer.
    ///
    /// Returns [`Insertion::Rejected`] if the buffer is full and the
    /// priority of the item does not exceed the current minimum.
    fn push(&mut self, item: Self::Item) -> Result<Insertion>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase: Sized {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// The type of batch generated for training.
    type Batch;

    /// Builds a new replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Result<Self>;

    /// Constructs a batch of `size` experiences for training.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;

    /// Updates the priorities of experiences in the buffer.
    ///
    /// `ixs` are positions returned in a batch, `priorities` the new values,
    /// typically the absolute TD errors.
    fn update_priority(&mut self, ixs: &[usize], priorities: &[f32]) -> Result<()>;
}
