//! Process-wide cache of loaded configurations
//!
//! Entries are keyed by config path and invalidated when the file's
//! modification time changes.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::trace;

use crate::config::{ConfigLoader, SortConfig};

#[derive(Debug)]
struct Entry {
    modified: SystemTime,
    config: Arc<SortConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached config for the loader's path, loading it on a miss
    pub fn get_or_load(&self, loader: &ConfigLoader) -> Arc<SortConfig> {
        let path = loader.path();
        if let Some(modified) = modified_time(path) {
            if let Some(entry) = self.entries.read().get(path) {
                if entry.modified == modified {
                    trace!(path = %path.display(), "config cache hit");
                    return Arc::clone(&entry.config);
                }
            }
        }

        let config = Arc::new(loader.load().config);
        // the load may have just written the default file
        if let Some(modified) = modified_time(path) {
            self.entries.write().insert(
                path.to_path_buf(),
                Entry {
                    modified,
                    config: Arc::clone(&config),
                },
            );
        }
        config
    }

    pub fn invalidate(&self, path: &Path) {
        self.entries.write().remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
