//! Lock-guarded gallery with atomic file persistence.
//!
//! Readers clone an `Arc<Gallery>` out of a short read lock and match
//! against it without holding any lock. Writers serialize on a separate
//! mutex that covers the whole check, mutate, persist and publish
//! sequence, so a new snapshot only becomes visible once it is on disk.

use crate::error::StoreError;
use crate::format;
use crate::gallery::Gallery;
use chrono::Utc;
use facematch_core::IdentityRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Options for opening a [`GalleryStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Rename a corrupt gallery file aside instead of leaving it to be
    /// overwritten by the next persist.
    pub quarantine_corrupt: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            quarantine_corrupt: true,
        }
    }
}

/// Why the store started with an empty gallery despite a file being present.
#[derive(Debug)]
pub struct LoadWarning {
    /// Always [`StoreError::Corrupt`].
    pub error: StoreError,
    /// Where the unreadable file was moved, if it was.
    pub quarantined: Option<PathBuf>,
}

/// Outcome of [`load`]: the gallery to start from, plus a warning when the
/// file existed but could not be used.
#[derive(Debug)]
pub struct Loaded {
    pub gallery: Gallery,
    pub warning: Option<LoadWarning>,
}

/// Read the gallery file at `path`.
///
/// Never fails: a missing file yields an empty gallery, an unreadable or
/// corrupt one yields an empty gallery and a [`LoadWarning`].
pub fn load(path: &Path, options: &StoreOptions) -> Loaded {
    let reason = match fs::read(path) {
        Ok(bytes) => match format::decode(&bytes) {
            Ok(gallery) => {
                tracing::info!(path = %path.display(), records = gallery.len(), "gallery loaded");
                return Loaded { gallery, warning: None };
            }
            Err(e) => e.to_string(),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no gallery file; starting empty");
            return Loaded {
                gallery: Gallery::new(),
                warning: None,
            };
        }
        Err(e) => format!("unreadable: {e}"),
    };

    let quarantined = if options.quarantine_corrupt {
        quarantine(path)
    } else {
        None
    };

    let error = StoreError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };
    tracing::warn!(
        error = %error,
        quarantined = ?quarantined,
        "gallery file unusable; starting with an empty gallery"
    );

    Loaded {
        gallery: Gallery::new(),
        warning: Some(LoadWarning { error, quarantined }),
    }
}

/// Move a bad gallery file to `<file>.corrupt-<UTC timestamp>`.
fn quarantine(path: &Path) -> Option<PathBuf> {
    let target = sibling(path, &format!("corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
    match fs::rename(path, &target) {
        Ok(()) => Some(target),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not quarantine corrupt gallery file");
            None
        }
    }
}

/// `<dir>/<file>.<suffix>`, keeping the original extension in the name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gallery".to_string());
    path.with_file_name(format!("{file_name}.{suffix}"))
}

/// Atomically replace the gallery file at `path` with `gallery`.
///
/// Writes `<file>.tmp` in the same directory, syncs it, renames it over
/// the target and syncs the directory. A concurrent reader sees either the
/// old file or the new one, never a partial write.
pub fn persist(path: &Path, gallery: &Gallery) -> Result<(), StoreError> {
    let bytes = format::encode(gallery).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: format!("encode: {e}"),
    })?;

    let temp_path = sibling(path, "tmp");
    let result = write_synced(&temp_path, &bytes).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    // Make the rename itself durable.
    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    tracing::debug!(path = %path.display(), records = gallery.len(), bytes = bytes.len(), "gallery persisted");
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    file.write_all(bytes).map_err(|e| StoreError::io(path, e))?;
    file.sync_all().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Shared, durable gallery of enrolled identities.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct GalleryStore {
    path: PathBuf,
    snapshot: RwLock<Arc<Gallery>>,
    writer: Mutex<()>,
    load_warning: Option<LoadWarning>,
}

impl GalleryStore {
    /// Open the gallery at `path`, creating its parent directory if needed.
    ///
    /// A corrupt file does not fail the open; see [`load_warning`](Self::load_warning).
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let Loaded { gallery, warning } = load(&path, &options);
        Ok(Self {
            path,
            snapshot: RwLock::new(Arc::new(gallery)),
            writer: Mutex::new(()),
            load_warning: warning,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set when the file present at open time had to be discarded.
    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.load_warning.as_ref()
    }

    /// Point-in-time view of the gallery. Never reflects an unpersisted mutation.
    pub fn snapshot(&self) -> Arc<Gallery> {
        // Only whole `Arc`s are ever stored, so a poisoned lock still holds a valid gallery.
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn list_names(&self) -> Vec<String> {
        self.snapshot().names()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.snapshot().dimension()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().contains(name)
    }

    /// Add a new identity and persist. Fails if `record.name` is taken.
    pub fn insert(&self, record: IdentityRecord) -> Result<(), StoreError> {
        let name = record.name.clone();
        let records = self.mutate(|gallery| gallery.insert(record))?;
        tracing::info!(name = %name, records, "identity enrolled");
        Ok(())
    }

    /// Remove an identity and persist. Returns the removed record.
    pub fn remove(&self, name: &str) -> Result<IdentityRecord, StoreError> {
        let (removed, records) = self.mutate_with(|gallery| gallery.remove(name))?;
        tracing::info!(name, records, "identity removed");
        Ok(removed)
    }

    fn mutate(&self, f: impl FnOnce(&mut Gallery) -> Result<(), StoreError>) -> Result<usize, StoreError> {
        self.mutate_with(f).map(|((), records)| records)
    }

    /// Run one read-modify-persist cycle under the writer lock.
    ///
    /// The new gallery is published only after it is durable; on any error
    /// the current snapshot is left untouched.
    fn mutate_with<T>(
        &self,
        f: impl FnOnce(&mut Gallery) -> Result<T, StoreError>,
    ) -> Result<(T, usize), StoreError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = Gallery::clone(&self.snapshot());
        let out = f(&mut next)?;
        persist(&self.path, &next)?;

        let records = next.len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        Ok((out, records))
    }
}
