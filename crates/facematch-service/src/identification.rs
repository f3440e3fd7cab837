use facematch_core::{DescriptorExtractor, EuclideanMatcher, ExtractError, Matcher, MATCH_THRESHOLD};
use facematch_store::GalleryStore;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentifyError {
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("probe descriptor has {actual} dimensions, gallery uses {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Answer to "who is this".
///
/// `distance` is the smallest distance to any enrolled identity, reported
/// on misses too; it is infinite when the gallery is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Identified { name: String, distance: f32 },
    Unidentified { distance: f32 },
}

impl MatchOutcome {
    pub fn is_identified(&self) -> bool {
        matches!(self, Self::Identified { .. })
    }

    pub fn distance(&self) -> f32 {
        match self {
            Self::Identified { distance, .. } | Self::Unidentified { distance } => *distance,
        }
    }
}

/// Read-only identification against the current gallery snapshot.
#[derive(Clone)]
pub struct IdentificationService {
    store: Arc<GalleryStore>,
    extractor: Arc<dyn DescriptorExtractor>,
}

impl IdentificationService {
    pub fn new(store: Arc<GalleryStore>, extractor: Arc<dyn DescriptorExtractor>) -> Self {
        Self { store, extractor }
    }

    pub fn identify(&self, image: &[u8]) -> Result<MatchOutcome, IdentifyError> {
        let query = self.extractor.extract(image)?;
        let snapshot = self.store.snapshot();

        if let Some(expected) = snapshot.dimension() {
            if query.dim() != expected {
                return Err(IdentifyError::DimensionMismatch {
                    expected,
                    actual: query.dim(),
                });
            }
        }

        let result = EuclideanMatcher.find_best(&query, snapshot.records(), MATCH_THRESHOLD);
        let outcome = match result.best_name {
            Some(name) => MatchOutcome::Identified {
                name,
                distance: result.best_distance,
            },
            None => MatchOutcome::Unidentified {
                distance: result.best_distance,
            },
        };

        match &outcome {
            MatchOutcome::Identified { name, distance } => {
                tracing::info!(name = %name, distance, "identified");
            }
            MatchOutcome::Unidentified { distance } => {
                tracing::info!(distance, candidates = snapshot.len(), "not identified");
            }
        }
        Ok(outcome)
    }
}
