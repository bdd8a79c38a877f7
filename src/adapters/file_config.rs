//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON document.  Every
//! config is validated before it is written and again after it is read,
//! so a hand-edited file with out-of-range values is rejected rather than
//! silently clamped.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;
use crate::error::Error;

/// Config store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored config, falling back to defaults when none exists.
    pub fn load_or_default(&self) -> Result<SystemConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                info!("FileConfigStore: no config at {}, using defaults", self.path.display());
                Ok(SystemConfig::default())
            }
            other => other,
        }
    }

    fn validate(config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate().map_err(|e| match e {
            Error::Config(msg) | Error::InvalidRun(msg) | Error::Storage(msg) => {
                ConfigError::ValidationFailed(msg)
            }
            Error::InvalidBounds { .. } => {
                ConfigError::ValidationFailed("PID output_min exceeds output_max")
            }
        })
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => {
                warn!("FileConfigStore: read {} failed: {}", self.path.display(), e);
                ConfigError::IoError
            }
        })?;
        let config: SystemConfig =
            serde_json::from_slice(&bytes).map_err(|_| ConfigError::Corrupted)?;
        Self::validate(&config)?;
        info!("FileConfigStore: loaded config for {}", config.dome_id);
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        Self::validate(config)?;
        let json = serde_json::to_vec_pretty(config).map_err(|_| ConfigError::IoError)?;

        // Write-then-rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("FileConfigStore: saved config to {}", self.path.display());
        Ok(())
    }
}
