//! On-disk gallery encoding.
//!
//! ```json
//! {
//!   "version": 1,
//!   "dimension": 128,
//!   "checksum": "<sha256 hex>",
//!   "records": [{ "name": "alice", "descriptor": [0.01, ...], "enrolled_at": "2024-05-01T12:00:00Z" }]
//! }
//! ```
//!
//! Records are stored in gallery order. `dimension` is `null` for an empty
//! gallery.

use crate::error::StoreError;
use crate::gallery::Gallery;
use facematch_core::IdentityRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported gallery format version {0} (this build reads {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("checksum mismatch: header {expected}, records hash to {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("header dimension {header:?} does not match record {name:?} with {actual} values")]
    DimensionMismatch {
        header: Option<usize>,
        name: String,
        actual: usize,
    },
    #[error("duplicate identity {0:?}")]
    DuplicateName(String),
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    dimension: Option<usize>,
    checksum: String,
    records: &'a [IdentityRecord],
}

#[derive(Deserialize)]
struct Envelope {
    dimension: Option<usize>,
    checksum: String,
    records: Vec<IdentityRecord>,
}

/// SHA-256 over name, NUL, length (u32 LE) and the f32 LE bytes of every record.
fn digest(records: &[IdentityRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        hasher.update(record.name.as_bytes());
        hasher.update([0u8]);
        hasher.update((record.descriptor.dim() as u32).to_le_bytes());
        for v in record.descriptor.values() {
            hasher.update(v.to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}

pub fn encode(gallery: &Gallery) -> Result<Vec<u8>, CodecError> {
    // Hash the values a reader will parse back, not the in-memory floats.
    let text = serde_json::to_vec(gallery.records())?;
    let parsed: Vec<IdentityRecord> = serde_json::from_slice(&text)?;

    let envelope = EnvelopeRef {
        version: FORMAT_VERSION,
        dimension: gallery.dimension(),
        checksum: digest(&parsed),
        records: gallery.records(),
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

pub fn decode(bytes: &[u8]) -> Result<Gallery, CodecError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)?;
    if probe.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(probe.version));
    }

    let envelope: Envelope = serde_json::from_slice(bytes)?;

    let actual = digest(&envelope.records);
    if actual != envelope.checksum {
        return Err(CodecError::ChecksumMismatch {
            expected: envelope.checksum,
            actual,
        });
    }

    let mut gallery = Gallery::new();
    for record in envelope.records {
        let actual = record.descriptor.dim();
        if Some(actual) != envelope.dimension {
            return Err(CodecError::DimensionMismatch {
                header: envelope.dimension,
                name: record.name,
                actual,
            });
        }
        let name = record.name.clone();
        gallery.insert(record).map_err(|e| match e {
            StoreError::AlreadyExists(name) => CodecError::DuplicateName(name),
            _ => CodecError::DimensionMismatch {
                header: envelope.dimension,
                name,
                actual,
            },
        })?;
    }
    Ok(gallery)
}
