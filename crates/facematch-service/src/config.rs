use std::path::PathBuf;

/// Service configuration, loaded from environment variables.
///
/// The match threshold is a fixed policy constant
/// ([`facematch_core::MATCH_THRESHOLD`]) and deliberately not configurable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the gallery file.
    pub gallery_path: PathBuf,
    /// Whether a corrupt gallery file is renamed aside at startup.
    pub quarantine_corrupt: bool,
}

impl Config {
    /// Load configuration from `FACEMATCH_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let gallery_path = var("FACEMATCH_GALLERY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir(&var).join("gallery.json"));

        Self {
            gallery_path,
            quarantine_corrupt: var("FACEMATCH_QUARANTINE_CORRUPT")
                .map(|v| v != "0")
                .unwrap_or(true),
        }
    }
}

/// `$XDG_DATA_HOME/facematch`, falling back to `$HOME/.local/share/facematch`.
fn default_data_dir(var: &impl Fn(&str) -> Option<String>) -> PathBuf {
    var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facematch")
}
