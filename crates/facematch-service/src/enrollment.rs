use facematch_core::{DescriptorExtractor, ExtractError, IdentityRecord};
use facematch_store::{GalleryStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("identity name must not be empty")]
    EmptyName,
}

#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Adds new named identities to the gallery.
#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<GalleryStore>,
    extractor: Arc<dyn DescriptorExtractor>,
}

impl EnrollmentService {
    pub fn new(store: Arc<GalleryStore>, extractor: Arc<dyn DescriptorExtractor>) -> Self {
        Self { store, extractor }
    }

    /// Extract a descriptor from `image` and enroll it under `name`.
    ///
    /// On success the record is already durable. On any error the gallery
    /// is unchanged. Names are never overwritten: re-enrolling an existing
    /// name fails with [`StoreError::AlreadyExists`].
    pub fn enroll(&self, name: &str, image: &[u8]) -> Result<IdentityRecord, EnrollError> {
        validate_name(name)?;

        // Cheap early exit; the store re-checks under its writer lock.
        if self.store.contains(name) {
            tracing::debug!(name, "enroll: name already taken");
            return Err(StoreError::AlreadyExists(name.to_string()).into());
        }

        let descriptor = self.extractor.extract(image).map_err(|e| {
            tracing::debug!(name, error = %e, "enroll: extraction failed");
            e
        })?;

        let record = IdentityRecord::new(name, descriptor);
        self.store.insert(record.clone())?;
        Ok(record)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{reopen, temp_store, FakeExtractor};
    use tempfile::TempDir;

    fn service(dir: &TempDir, extractor: FakeExtractor) -> EnrollmentService {
        EnrollmentService::new(temp_store(dir), Arc::new(extractor))
    }

    #[test]
    fn test_enroll_persists_before_returning() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, FakeExtractor::default().face(b"img", &[0.1, 0.2, 0.3]));

        let record = svc.enroll("carol", b"img").unwrap();
        assert_eq!(record.name, "carol");

        let reloaded = reopen(&tmp);
        assert_eq!(reloaded.snapshot().get("carol"), Some(&record));
    }

    #[test]
    fn test_enroll_rejects_empty_name() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, FakeExtractor::default().face(b"img", &[0.1]));
        for name in ["", "   ", "\t\n"] {
            let err = svc.enroll(name, b"img").unwrap_err();
            assert!(matches!(err, EnrollError::Validation(ValidationError::EmptyName)));
        }
        assert!(reopen(&tmp).is_empty());
    }

    #[test]
    fn test_enroll_duplicate_checked_before_extraction() {
        let tmp = TempDir::new().unwrap();
        let svc = service(
            &tmp,
            FakeExtractor::default()
                .face(b"img", &[0.1])
                .failure(b"bad", ExtractError::NoFaceFound),
        );
        svc.enroll("carol", b"img").unwrap();

        // The duplicate wins over the extraction failure.
        let err = svc.enroll("carol", b"bad").unwrap_err();
        assert!(matches!(err, EnrollError::Store(StoreError::AlreadyExists(ref n)) if n == "carol"));
    }

    #[test]
    fn test_enroll_decode_failure() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, FakeExtractor::default());
        let err = svc.enroll("erin", b"garbage").unwrap_err();
        assert!(matches!(err, EnrollError::Extract(ExtractError::DecodeFailed(_))));
        assert!(reopen(&tmp).is_empty());
    }

    #[test]
    fn test_enroll_dimension_mismatch_rejected() {
        let tmp = TempDir::new().unwrap();
        let svc = service(
            &tmp,
            FakeExtractor::default().face(b"a", &[0.1, 0.2]).face(b"b", &[0.1, 0.2, 0.3]),
        );
        svc.enroll("alice", b"a").unwrap();
        let err = svc.enroll("bob", b"b").unwrap_err();
        assert!(matches!(
            err,
            EnrollError::Store(StoreError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert_eq!(reopen(&tmp).list_names(), vec!["alice"]);
    }

    #[test]
    fn test_enroll_keeps_name_verbatim() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, FakeExtractor::default().face(b"img", &[0.1]));
        svc.enroll(" Zoë ", b"img").unwrap();
        assert_eq!(reopen(&tmp).list_names(), vec![" Zoë "]);
    }
}
