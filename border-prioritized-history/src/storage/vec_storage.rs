//! Storage of a single unnamed value per slot.
use super::Schema;
use crate::{
    base::{BuildStorage, SlotStorage},
    error::{HistoryError, Result},
};

/// A storage holding one value of type `T` per slot.
#[derive(Debug, Clone, PartialEq)]
pub struct VecStorage<T> {
    data: Vec<T>,
}

impl<T: Clone + Default> VecStorage<T> {
    /// Creates a storage of `capacity` slots filled with `T::default()`.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![T::default(); capacity],
        }
    }
}

impl<T> VecStorage<T> {
    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot < self.data.len() {
            Ok(())
        } else {
            Err(HistoryError::IndexOutOfRange {
                index: slot,
                size: self.data.len(),
            })
        }
    }

    /// Returns the value in `slot`.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.data.get(slot)
    }
}

impl<T: Clone> SlotStorage for VecStorage<T> {
    type Item = T;
    type Batch = Vec<T>;

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn write(&mut self, slot: usize, item: T) -> Result<()> {
        self.check_slot(slot)?;
        self.data[slot] = item;
        Ok(())
    }

    fn read(&self, slots: &[usize]) -> Result<Vec<T>> {
        slots
            .iter()
            .map(|&slot| {
                self.check_slot(slot)?;
                Ok(self.data[slot].clone())
            })
            .collect()
    }
}

impl<T: Clone + Default> BuildStorage for VecStorage<T> {
    fn build(capacity: usize, schema: Option<&Schema>) -> Result<Self> {
        match schema {
            None => Ok(Self::new(capacity)),
            Some(_) => Err(HistoryError::InvalidConfiguration(
                "VecStorage holds a single unnamed field and takes no schema".to_string(),
            )),
        }
    }
}
