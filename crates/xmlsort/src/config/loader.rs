//! Loading the sort configuration from a project directory
//!
//! A missing or unreadable config file is never an error: the loader falls
//! back to the default configuration. When the file is missing, the default
//! is written to the config path so the next run finds a file to edit. An
//! existing file is never overwritten, even when it does not parse. The write
//! goes through a temp file and a rename, so a failed or concurrent run
//! cannot leave a half-written config.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::config::{RawSortConfig, SortConfig};
use crate::error::Result;
use crate::utils::write_atomic;

/// Conventional config file name, relative to the project root
pub const DEFAULT_CONFIG_FILE: &str = "xmlformatter.cfg";

/// Where a loaded configuration came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaulted {
        path: PathBuf,
        reason: String,
        /// Whether the default was written back to `path`
        persisted: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedConfig {
    pub config: SortConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    pub const fn is_default(&self) -> bool {
        matches!(self.source, ConfigSource::Defaulted { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ConfigLoader {
    path: PathBuf,
    default: RawSortConfig,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default: RawSortConfig::default(),
        }
    }

    /// Loader for `<root>/xmlformatter.cfg`
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_CONFIG_FILE))
    }

    /// Replace the configuration used (and persisted) on fallback
    pub fn with_default(mut self, default: RawSortConfig) -> Self {
        self.default = default;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, falling back to the default on any failure.
    ///
    /// Only a missing file gets the default written in its place. A file that
    /// exists but cannot be read or parsed is left untouched.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> LoadedConfig {
        let (reason, persisted) = match self.read() {
            Ok(raw) => {
                debug!("loaded sort configuration");
                return LoadedConfig {
                    config: SortConfig::from_raw(&raw),
                    source: ConfigSource::File(self.path.clone()),
                };
            }
            Err(ReadFailure::Missing(reason)) => {
                warn!(%reason, "sort configuration missing, using default");
                (reason, self.persist_default())
            }
            Err(ReadFailure::Invalid(reason)) => {
                warn!(%reason, "sort configuration unusable, using default and keeping the file");
                (reason, false)
            }
        };

        LoadedConfig {
            config: SortConfig::from_raw(&self.default),
            source: ConfigSource::Defaulted {
                path: self.path.clone(),
                reason,
                persisted,
            },
        }
    }

    /// Load the configuration without any fallback or write-back
    pub fn load_strict(&self) -> Result<SortConfig> {
        let content = fs::read_to_string(&self.path)?;
        SortConfig::from_json_str(&content)
    }

    fn read(&self) -> std::result::Result<RawSortConfig, ReadFailure> {
        let content = fs::read_to_string(&self.path).map_err(|err| {
            let reason = format!("failed to read {}: {err}", self.path.display());
            if err.kind() == io::ErrorKind::NotFound {
                ReadFailure::Missing(reason)
            } else {
                ReadFailure::Invalid(reason)
            }
        })?;
        RawSortConfig::from_json_str(&content).map_err(|err| {
            ReadFailure::Invalid(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    fn persist_default(&self) -> bool {
        let written = self
            .default
            .to_json_string()
            .and_then(|content| write_atomic(&self.path, content.as_bytes()));
        match written {
            Ok(()) => {
                info!("wrote default sort configuration");
                true
            }
            Err(err) => {
                warn!(error = %err, "could not write default sort configuration");
                false
            }
        }
    }
}

enum ReadFailure {
    Missing(String),
    Invalid(String),
}
