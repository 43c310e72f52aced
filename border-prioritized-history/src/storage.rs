//! Payload storage backends.
//!
//! * [`VecStorage`] keeps one unnamed value per slot.
//! * [`FieldStorage`] keeps a record of named, fixed-shape fields per slot.
mod field_storage;
mod vec_storage;
pub use field_storage::{
    DType, FieldRecord, FieldSpec, FieldStorage, FieldValue, Schema, SINGLETON,
};
pub use vec_storage::VecStorage;
