use std::env;
use std::path::{Path, PathBuf};

/// Snapshot store configuration.
///
/// Reads from the `ITINERA_STORE_DIR` environment variable, falling back to
/// the platform data directory (`~/.local/share/itinera/trips` on Linux)
/// when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one JSON snapshot file per trip.
    pub dir: PathBuf,
}

impl StoreConfig {
    /// Environment variable overriding the snapshot directory.
    pub const ENV_VAR: &str = "ITINERA_STORE_DIR";

    /// Build a config from the environment.
    ///
    /// Priority: `ITINERA_STORE_DIR` env var, then [`StoreConfig::default_dir`].
    pub fn from_env() -> Self {
        let dir = env::var_os(Self::ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_dir);
        Self { dir }
    }

    /// Build a config from an explicit directory (useful for tests).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory used when nothing else is configured.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("itinera")
            .join("trips")
    }

    /// Path of the snapshot file for `key`. The key is not validated here.
    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
