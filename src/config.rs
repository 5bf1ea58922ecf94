use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::assets::DEFAULT_EXTENSION;
use crate::wheel::Category;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings read at startup. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Raw duration input, coerced the same way as typed input
    pub duration: String,
    pub level: Option<Category>,
    pub assets_dir: PathBuf,
    pub image_extension: String,
    pub sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: "4".to_string(),
            level: None,
            assets_dir: PathBuf::from("assets"),
            image_extension: DEFAULT_EXTENSION.to_string(),
            sound: false,
        }
    }
}

pub trait ConfigStore {
    fn try_load(&self) -> Result<Config, ConfigError>;

    /// Load, falling back to defaults when the file is missing or broken
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Config::default()
            }
            Err(e) => {
                warn!(error = %e, "using default configuration");
                Config::default()
            }
        }
    }
}

/// Read-only JSON config file
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("ruleta_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice::<Config>(&bytes).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}
