use crate::error::StoreError;
use facematch_core::IdentityRecord;

/// Enrolled identities in insertion order, unique by name.
///
/// All records share one descriptor dimension, fixed by the first record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gallery {
    records: Vec<IdentityRecord>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Descriptor dimension shared by every record, `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.descriptor.dim())
    }

    pub fn records(&self) -> &[IdentityRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&IdentityRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    /// Append a record. Rejects duplicate names and foreign dimensions.
    pub fn insert(&mut self, record: IdentityRecord) -> Result<(), StoreError> {
        if self.contains(&record.name) {
            return Err(StoreError::AlreadyExists(record.name));
        }
        if let Some(expected) = self.dimension() {
            let actual = record.descriptor.dim();
            if actual != expected {
                return Err(StoreError::DimensionMismatch { expected, actual });
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<IdentityRecord, StoreError> {
        let idx = self
            .records
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Ok(self.records.remove(idx))
    }
}
