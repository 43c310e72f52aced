//! Storage of records with named, fixed-shape fields.
//!
//! Each field of a record is a flat, row-major array whose shape and element
//! type are fixed by a [`Schema`]. Every field has its own column of
//! `capacity` rows, and all columns are addressed by the same slot id.
//!
//! ```rust
//! use border_prioritized_history::{
//!     storage::{DType, FieldRecord, FieldSpec, FieldStorage, FieldValue, Schema},
//!     SlotStorage,
//! };
//!
//! let mut schema = Schema::new();
//! schema.insert("obs".to_string(), FieldSpec::new(vec![2], DType::F32));
//! schema.insert("act".to_string(), FieldSpec::scalar(DType::I64));
//! let mut storage = FieldStorage::new(8, schema).unwrap();
//!
//! let mut record = FieldRecord::new();
//! record.insert("obs".to_string(), FieldValue::F32(vec![0.5, 1.5]));
//! record.insert("act".to_string(), FieldValue::I64(vec![3]));
//! storage.write(5, record).unwrap();
//!
//! let batch = storage.read(&[5, 5]).unwrap();
//! assert_eq!(batch["act"], FieldValue::I64(vec![3, 3]));
//! ```
use crate::{
    base::{BuildStorage, SlotStorage},
    error::{HistoryError, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the only field of a storage built with [`FieldStorage::singleton`].
pub const SINGLETON: &str = "";

/// Element types of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    /// 32-bit float.
    F32,

    /// 64-bit signed integer.
    I64,

    /// 8-bit signed integer, typically flags.
    I8,
}

/// Shape and element type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Shape of one record of the field. Empty for scalars.
    pub shape: Vec<usize>,

    /// Element type.
    pub dtype: DType,
}

impl FieldSpec {
    /// Creates a field with the given shape and element type.
    pub fn new(shape: Vec<usize>, dtype: DType) -> Self {
        Self { shape, dtype }
    }

    /// Creates a scalar field.
    pub fn scalar(dtype: DType) -> Self {
        Self::new(vec![], dtype)
    }

    /// Number of elements of one record of the field.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Mapping from field names to field specs.
pub type Schema = BTreeMap<String, FieldSpec>;

/// Flat values of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 32-bit floats.
    F32(Vec<f32>),

    /// 64-bit signed integers.
    I64(Vec<i64>),

    /// 8-bit signed integers.
    I8(Vec<i8>),
}

/// A record or a batch of records, keyed by field name.
pub type FieldRecord = BTreeMap<String, FieldValue>;

impl FieldValue {
    fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::F32 => Self::F32(vec![0.0; len]),
            DType::I64 => Self::I64(vec![0; len]),
            DType::I8 => Self::I8(vec![0; len]),
        }
    }

    /// Element type of the values.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I64(_) => DType::I64,
            Self::I8(_) => DType::I8,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::I8(v) => v.len(),
        }
    }

    /// Returns `true` if there is no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `src` into row `row` of rows of `numel` elements.
    fn put_row(&mut self, row: usize, numel: usize, src: &FieldValue) -> Result<()> {
        let range = row * numel..(row + 1) * numel;
        match (self, src) {
            (Self::F32(d), Self::F32(s)) => d[range].copy_from_slice(s),
            (Self::I64(d), Self::I64(s)) => d[range].copy_from_slice(s),
            (Self::I8(d), Self::I8(s)) => d[range].copy_from_slice(s),
            (d, s) => {
                return Err(HistoryError::SchemaMismatch(format!(
                    "expected {:?}, got {:?}",
                    d.dtype(),
                    s.dtype()
                )))
            }
        }
        Ok(())
    }

    /// Concatenates the given rows of `numel` elements.
    fn gather(&self, rows: &[usize], numel: usize) -> Self {
        fn take<T: Copy>(v: &[T], rows: &[usize], numel: usize) -> Vec<T> {
            rows.iter()
                .flat_map(|&r| v[r * numel..(r + 1) * numel].iter().copied())
                .collect()
        }

        match self {
            Self::F32(v) => Self::F32(take(v, rows, numel)),
            Self::I64(v) => Self::I64(take(v, rows, numel)),
            Self::I8(v) => Self::I8(take(v, rows, numel)),
        }
    }
}

/// A storage of records with named fields laid out after a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldStorage {
    capacity: usize,
    schema: Schema,
    columns: BTreeMap<String, FieldValue>,
}

impl FieldStorage {
    /// Creates a zero-filled storage of `capacity` records.
    pub fn new(capacity: usize, schema: Schema) -> Result<Self> {
        if capacity == 0 {
            return Err(HistoryError::InvalidConfiguration(
                "capacity must be positive".to_string(),
            ));
        }
        if schema.is_empty() {
            return Err(HistoryError::InvalidConfiguration(
                "schema has no field".to_string(),
            ));
        }
        if let Some((name, _)) = schema.iter().find(|(_, spec)| spec.numel() == 0) {
            return Err(HistoryError::InvalidConfiguration(format!(
                "field '{}' has no element",
                name
            )));
        }

        let columns = schema
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    FieldValue::zeros(spec.dtype, capacity * spec.numel()),
                )
            })
            .collect();

        Ok(Self {
            capacity,
            schema,
            columns,
        })
    }

    /// Creates a storage with a single field named [`SINGLETON`].
    pub fn singleton(capacity: usize, spec: FieldSpec) -> Result<Self> {
        let mut schema = Schema::new();
        schema.insert(SINGLETON.to_string(), spec);
        Self::new(capacity, schema)
    }

    /// Returns the schema of the records.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot < self.capacity {
            Ok(())
        } else {
            Err(HistoryError::IndexOutOfRange {
                index: slot,
                size: self.capacity,
            })
        }
    }
}

impl SlotStorage for FieldStorage {
    type Item = FieldRecord;
    type Batch = FieldRecord;

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn check(&self, item: &FieldRecord) -> Result<()> {
        if let Some(name) = item.keys().find(|k| !self.schema.contains_key(*k)) {
            return Err(HistoryError::SchemaMismatch(format!(
                "unknown field '{}'",
                name
            )));
        }
        for (name, spec) in self.schema.iter() {
            let value = item.get(name).ok_or_else(|| {
                HistoryError::SchemaMismatch(format!("missing field '{}'", name))
            })?;
            if value.dtype() != spec.dtype {
                return Err(HistoryError::SchemaMismatch(format!(
                    "field '{}' expects {:?}, got {:?}",
                    name,
                    spec.dtype,
                    value.dtype()
                )));
            }
            if value.len() != spec.numel() {
                return Err(HistoryError::SchemaMismatch(format!(
                    "field '{}' expects {} elements of shape {:?}, got {}",
                    name,
                    spec.numel(),
                    spec.shape,
                    value.len()
                )));
            }
        }
        Ok(())
    }

    fn write(&mut self, slot: usize, item: FieldRecord) -> Result<()> {
        self.check_slot(slot)?;
        self.check(&item)?;

        for (name, value) in item.iter() {
            let numel = self.schema[name].numel();
            if let Some(column) = self.columns.get_mut(name) {
                column.put_row(slot, numel, value)?;
            }
        }
        Ok(())
    }

    fn read(&self, slots: &[usize]) -> Result<FieldRecord> {
        for &slot in slots.iter() {
            self.check_slot(slot)?;
        }

        Ok(self
            .columns
            .iter()
            .map(|(name, column)| {
                let numel = self.schema[name].numel();
                (name.clone(), column.gather(slots, numel))
            })
            .collect())
    }
}

impl BuildStorage for FieldStorage {
    fn build(capacity: usize, schema: Option<&Schema>) -> Result<Self> {
        match schema {
            Some(schema) => Self::new(capacity, schema.clone()),
            None => Err(HistoryError::InvalidConfiguration(
                "FieldStorage requires a schema".to_string(),
            )),
        }
    }
}
