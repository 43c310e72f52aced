//! Core functionalities.
mod replay_buffer;
mod storage;
mod uniform;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use storage::{BuildStorage, SlotStorage};
pub use uniform::UniformSource;
