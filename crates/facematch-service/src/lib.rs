//! facematch-service — Enrollment, identification and administration.
//!
//! Each service holds a handle to one shared [`GalleryStore`] and is
//! `Clone + Send + Sync`, so a transport layer can call them from as many
//! threads as it likes.

pub mod administration;
pub mod config;
pub mod enrollment;
pub mod identification;

use facematch_core::DescriptorExtractor;
use facematch_store::{GalleryStore, StoreError, StoreOptions};
use std::sync::Arc;

pub use administration::{AdministrationService, GalleryStatus};
pub use config::Config;
pub use enrollment::{EnrollError, EnrollmentService, ValidationError};
pub use identification::{IdentificationService, IdentifyError, MatchOutcome};

/// The three services wired to a single gallery store.
#[derive(Clone)]
pub struct Services {
    pub enrollment: EnrollmentService,
    pub identification: IdentificationService,
    pub administration: AdministrationService,
}

impl Services {
    /// Open the gallery named by `config` and build all services over it.
    pub fn open(config: &Config, extractor: Arc<dyn DescriptorExtractor>) -> Result<Self, StoreError> {
        let store = GalleryStore::open(
            &config.gallery_path,
            StoreOptions {
                quarantine_corrupt: config.quarantine_corrupt,
            },
        )?;
        tracing::info!(
            path = %store.path().display(),
            records = store.len(),
            dimension = ?store.dimension(),
            "gallery store ready"
        );
        Ok(Self::with_store(Arc::new(store), extractor))
    }

    pub fn with_store(store: Arc<GalleryStore>, extractor: Arc<dyn DescriptorExtractor>) -> Self {
        Self {
            enrollment: EnrollmentService::new(Arc::clone(&store), Arc::clone(&extractor)),
            identification: IdentificationService::new(Arc::clone(&store), extractor),
            administration: AdministrationService::new(store),
        }
    }
}
