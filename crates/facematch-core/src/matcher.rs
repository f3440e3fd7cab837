//! Nearest-neighbor matching of a probe descriptor against a gallery.

use crate::types::{Descriptor, IdentityRecord, MatchResult};

/// Euclidean distance below which two descriptors are the same person.
pub const MATCH_THRESHOLD: f32 = 0.6;

/// Distance reported when nothing was compared (empty gallery).
pub const NO_MATCH_DISTANCE: f32 = f32::INFINITY;

/// Strategy for comparing a probe descriptor against a gallery of enrolled identities.
pub trait Matcher {
    fn find_best(&self, query: &Descriptor, gallery: &[IdentityRecord], threshold: f32) -> MatchResult;
}

/// Euclidean nearest-neighbor matcher.
///
/// Walks the gallery in order. `best_distance` follows every strictly
/// smaller distance; `best_name` is assigned only on those same updates and
/// only when the new distance is also strictly below `threshold`. It is
/// never cleared afterwards. Ties keep the earlier record.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn find_best(&self, query: &Descriptor, gallery: &[IdentityRecord], threshold: f32) -> MatchResult {
        let mut best_distance = NO_MATCH_DISTANCE;
        let mut best_name: Option<&str> = None;

        for record in gallery {
            if record.descriptor.dim() != query.dim() {
                tracing::warn!(
                    name = %record.name,
                    expected = query.dim(),
                    actual = record.descriptor.dim(),
                    "skipping record with mismatched descriptor dimension"
                );
                continue;
            }

            let distance = query.euclidean_distance(&record.descriptor);
            tracing::trace!(name = %record.name, distance, "compared");

            if distance < best_distance {
                best_distance = distance;
                if distance < threshold {
                    best_name = Some(&record.name);
                }
            }
        }

        MatchResult {
            query: query.clone(),
            best_name: best_name.map(str::to_owned),
            best_distance,
        }
    }
}
