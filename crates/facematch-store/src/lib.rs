//! facematch-store — Persisted gallery of enrolled identities.
//!
//! The gallery lives in memory as an immutable snapshot behind a lock and is
//! mirrored to a single JSON file that is replaced atomically on every
//! mutation.

pub mod error;
pub mod format;
pub mod gallery;
pub mod store;

pub use error::StoreError;
pub use gallery::Gallery;
pub use store::{GalleryStore, LoadWarning, StoreOptions};
