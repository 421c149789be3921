use crate::domain::{config::TermConfig, error::{TermError, TermResult}};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Locates and reads the optional configuration file
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Uses the per-user configuration file, if a config directory exists
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Uses an explicit configuration file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// `<config dir>/serialterm/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("serialterm").join("config.toml"))
    }

    /// Loads the configuration, falling back to built-in defaults when no
    /// file exists
    pub fn load_config(&self) -> TermResult<TermConfig> {
        match &self.config_path {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                self.load_config_from_path(path)
            }
            _ => Ok(TermConfig::default()),
        }
    }

    /// Like [`load_config`](Self::load_config) but reports a broken file and
    /// carries on with defaults
    pub fn load_or_default(&self) -> TermConfig {
        self.load_config().unwrap_or_else(|e| {
            warn!("{}; using built-in defaults", e);
            TermConfig::default()
        })
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> TermResult<TermConfig> {
        let content = fs::read_to_string(path).map_err(|e| TermError::ConfigInvalid {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| TermError::ConfigInvalid {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &TermConfig) -> TermResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TermError::ConfigInvalid {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| TermError::ConfigInvalid {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| TermError::ConfigInvalid {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
