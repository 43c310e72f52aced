//! Configuration of [`PrioritizedHistory`](super::PrioritizedHistory).
use crate::{
    error::HistoryError,
    storage::{FieldSpec, Schema},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PrioritizedHistory`](super::PrioritizedHistory).
///
/// # Examples
///
/// ```rust
/// use border_prioritized_history::{DType, FieldSpec, PrioritizedHistoryConfig};
///
/// let config = PrioritizedHistoryConfig::default()
///     .capacity(100_000)
///     .seed(7)
///     .field("obs", FieldSpec::new(vec![4], DType::F32))
///     .field("act", FieldSpec::scalar(DType::I64));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PrioritizedHistoryConfig {
    /// Maximum number of entries kept in the history.
    pub capacity: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,

    /// Layout of the records, for storages with named fields.
    pub schema: Option<Schema>,
}

impl Default for PrioritizedHistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
            schema: None,
        }
    }
}

impl PrioritizedHistoryConfig {
    /// Sets the capacity of the history.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of entries, must be positive
    ///
    /// # Returns
    ///
    /// The modified configuration
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the schema of the records.
    pub fn schema(mut self, schema: Option<Schema>) -> Self {
        self.schema = schema;
        self
    }

    /// Adds a field to the schema, creating the schema if needed.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the field; a field of the same name is replaced
    /// * `spec` - Shape and element type of the field
    ///
    /// # Returns
    ///
    /// The modified configuration
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.schema
            .get_or_insert_with(Schema::new)
            .insert(name.into(), spec);
        self
    }

    /// Checks the capacity and the schema.
    pub fn validate(&self) -> std::result::Result<(), HistoryError> {
        if self.capacity == 0 {
            return Err(HistoryError::InvalidConfiguration(
                "capacity must be positive".to_string(),
            ));
        }
        if let Some(schema) = &self.schema {
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
        }
        Ok(())
    }

    /// Loads the configuration from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Returns
    ///
    /// The loaded configuration. It is not validated; call
    /// [`validate`](Self::validate) before building a history from it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the file to create or overwrite
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
