//! facematch-core — Face descriptors and nearest-neighbor identification.
//!
//! Holds the descriptor and identity types, the Euclidean matcher used to
//! identify a probe against a gallery snapshot, and the boundary trait for
//! the external descriptor extractor.

pub mod extractor;
pub mod matcher;
pub mod types;

pub use extractor::{DescriptorExtractor, ExtractError, FaceEncoder, FaceReportExtractor, ImageExtractor};
pub use matcher::{EuclideanMatcher, Matcher, MATCH_THRESHOLD, NO_MATCH_DISTANCE};
pub use types::{Descriptor, DescriptorError, IdentityRecord, MatchResult};
