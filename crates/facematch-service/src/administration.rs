use facematch_store::{GalleryStore, StoreError};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Summary of the gallery for operators.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryStatus {
    pub path: PathBuf,
    pub records: usize,
    pub dimension: Option<usize>,
    /// Why the gallery file present at startup was discarded, if it was.
    pub load_warning: Option<String>,
    pub quarantined: Option<PathBuf>,
}

/// List and delete enrolled identities.
#[derive(Clone)]
pub struct AdministrationService {
    store: Arc<GalleryStore>,
}

impl AdministrationService {
    pub fn new(store: Arc<GalleryStore>) -> Self {
        Self { store }
    }

    /// Enrolled names in enrollment order.
    pub fn list(&self) -> Vec<String> {
        self.store.list_names()
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.store.remove(name).map(|_| ())
    }

    pub fn status(&self) -> GalleryStatus {
        let snapshot = self.store.snapshot();
        let warning = self.store.load_warning();
        GalleryStatus {
            path: self.store.path().to_path_buf(),
            records: snapshot.len(),
            dimension: snapshot.dimension(),
            load_warning: warning.map(|w| w.error.to_string()),
            quarantined: warning.and_then(|w| w.quarantined.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{reopen, temp_store};
    use facematch_core::{Descriptor, IdentityRecord};
    use tempfile::TempDir;

    fn seeded(dir: &TempDir, names: &[&str]) -> AdministrationService {
        let store = temp_store(dir);
        for name in names {
            store
                .insert(IdentityRecord::new(*name, Descriptor::new(vec![0.5, 0.5]).unwrap()))
                .unwrap();
        }
        AdministrationService::new(store)
    }

    #[test]
    fn test_list_in_enrollment_order() {
        let tmp = TempDir::new().unwrap();
        let svc = seeded(&tmp, &["carol", "alice", "bob"]);
        assert_eq!(svc.list(), vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_delete_existing() {
        let tmp = TempDir::new().unwrap();
        let svc = seeded(&tmp, &["alice", "bob"]);
        svc.delete("alice").unwrap();
        assert_eq!(svc.list(), vec!["bob"]);
        assert_eq!(reopen(&tmp).list_names(), vec!["bob"]);
    }

    #[test]
    fn test_delete_missing() {
        let tmp = TempDir::new().unwrap();
        let svc = seeded(&tmp, &["alice"]);
        let err = svc.delete("mallory").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref n) if n == "mallory"));
        assert_eq!(reopen(&tmp).list_names(), vec!["alice"]);
    }

    #[test]
    fn test_status() {
        let tmp = TempDir::new().unwrap();
        let svc = seeded(&tmp, &["alice", "bob"]);
        let status = svc.status();
        assert_eq!(status.records, 2);
        assert_eq!(status.dimension, Some(2));
        assert_eq!(status.path, tmp.path().join("gallery.json"));
        assert!(status.load_warning.is_none());
    }

    #[test]
    fn test_status_reports_corrupt_startup() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("gallery.json"), b"not a gallery").unwrap();
        let svc = AdministrationService::new(temp_store(&tmp));
        let status = svc.status();
        assert_eq!(status.records, 0);
        assert!(status.load_warning.unwrap().contains("corrupt"));
        assert!(status.quarantined.is_some());
    }
}
