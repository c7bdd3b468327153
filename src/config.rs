use crate::storage::WriteOptions;
use std::path::{Path, PathBuf};

/// Store configuration
///
/// Holds the base directory and write behaviour of a `TableStore`. Built with
/// chained setters:
///
/// ```
/// use flatdb::StoreConfig;
///
/// let config = StoreConfig::new()
///     .base_path("/var/lib/flatdb")
///     .create_missing_dirs(true)
///     .sync_writes(true);
/// assert!(config.atomic_rewrite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the table files. `None` until configured.
    pub base_path: Option<PathBuf>,

    /// Create the base directory (and parents) when it does not exist
    pub create_missing_dirs: bool,

    /// Rewrite tables through a temporary file and an atomic rename
    pub atomic_rewrite: bool,

    /// fsync after every write
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self {
            base_path: None,
            create_missing_dirs: false,
            atomic_rewrite: true,
            sync_writes: false,
        }
    }

    /// Set the base directory
    pub fn base_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn create_missing_dirs(mut self, enabled: bool) -> Self {
        self.create_missing_dirs = enabled;
        self
    }

    pub fn atomic_rewrite(mut self, enabled: bool) -> Self {
        self.atomic_rewrite = enabled;
        self
    }

    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.sync_writes = enabled;
        self
    }

    pub(crate) fn write_options(&self) -> WriteOptions {
        WriteOptions {
            atomic_rewrite: self.atomic_rewrite,
            sync: self.sync_writes,
        }
    }
}
