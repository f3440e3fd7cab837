use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("descriptor is empty")]
    Empty,
    #[error("descriptor value at index {index} is not finite ({value})")]
    NonFinite { index: usize, value: f32 },
}

/// Face descriptor produced by the extractor (typically 128-dimensional).
///
/// Always non-empty and finite. Immutable once built; compare two
/// descriptors with [`euclidean_distance`](Self::euclidean_distance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Descriptor {
    values: Vec<f32>,
}

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Result<Self, DescriptorError> {
        if values.is_empty() {
            return Err(DescriptorError::Empty);
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DescriptorError::NonFinite { index, value });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Compute Euclidean distance between two descriptors.
    ///
    /// Callers are expected to compare descriptors of equal dimension;
    /// extra trailing values on either side are ignored.
    pub fn euclidean_distance(&self, other: &Descriptor) -> f32 {
        debug_assert_eq!(self.dim(), other.dim(), "descriptor dimension mismatch");
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl TryFrom<Vec<f32>> for Descriptor {
    type Error = DescriptorError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Descriptor> for Vec<f32> {
    fn from(d: Descriptor) -> Self {
        d.values
    }
}

/// An enrolled identity. One per person, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: String,
    pub descriptor: Descriptor,
    pub enrolled_at: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            enrolled_at: Utc::now(),
        }
    }
}

/// Result of matching a probe descriptor against a gallery snapshot.
///
/// Built fresh per identification request, never persisted.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub query: Descriptor,
    /// Name of the matched identity, `None` when unknown.
    pub best_name: Option<String>,
    /// Smallest distance seen across the whole gallery, matched or not.
    pub best_distance: f32,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        self.best_name.is_some()
    }
}
