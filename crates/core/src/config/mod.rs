//! Configuration for the hook core
//!
//! `CoreConfig` is a serde struct stored as TOML. A default file is written
//! the first time the config is loaded.
//!
//! # Example
//!
//! ```toml
//! version = 1
//! debug = false
//! log_filter = "finhook_core=trace"
//! signal_queue_capacity = 1024
//! disabled_hooks = ["power_circuit"]
//! ```

mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{configs_dir, core_config_path, finhook_base_dir, HOME_ENV};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine config directory from the host location
    #[error("Config directory not available - could not resolve finhook base path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default capacity of a listener's signal queue
pub const DEFAULT_SIGNAL_QUEUE_CAPACITY: usize = 1024;

/// Core hook configuration.
///
/// Loaded from `<base>/configs/core.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Log filter directive, overrides `debug` when set
    pub log_filter: Option<String>,

    /// Capacity of each listener's signal queue
    pub signal_queue_capacity: usize,

    /// Hook ids that are never installed
    pub disabled_hooks: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            log_filter: None,
            signal_queue_capacity: DEFAULT_SIGNAL_QUEUE_CAPACITY,
            disabled_hooks: Vec::new(),
        }
    }
}

impl CoreConfig {
    /// Load core config from file, creating default if missing.
    pub fn load() -> ConfigResult<Self> {
        let path = core_config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let default = Self::default();
            default.save_to(&path)?;
            tracing::info!("Created default core config at {:?}", path);
            Ok(default)
        }
    }

    /// Load core config from an explicit path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded core config from {:?}", path);
        Ok(config)
    }

    /// Save core config to its default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&core_config_path()?)
    }

    /// Save core config to an explicit path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved core config to {:?}", path);
        Ok(())
    }

    /// Reload core config from file.
    pub fn reload(&mut self) -> ConfigResult<()> {
        let path = core_config_path()?;
        *self = Self::load_from(&path)?;
        tracing::debug!("Reloaded core config from {:?}", path);
        Ok(())
    }

    /// Check if a hook id is disabled
    pub fn is_hook_disabled(&self, hook: &str) -> bool {
        self.disabled_hooks.iter().any(|h| h == hook)
    }

    /// Log filter directive for the subscriber
    pub fn filter_directive(&self) -> String {
        match &self.log_filter {
            Some(filter) => filter.clone(),
            None if self.debug => "debug".to_string(),
            None => "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_config_default() {
        let config = CoreConfig::default();
        assert_eq!(config.version, 1);
        assert!(!config.debug);
        assert_eq!(config.signal_queue_capacity, DEFAULT_SIGNAL_QUEUE_CAPACITY);
        assert!(config.disabled_hooks.is_empty());
        assert_eq!(config.filter_directive(), "info");
    }

    #[test]
    fn test_core_config_serialize() {
        let config = CoreConfig {
            version: 2,
            debug: true,
            disabled_hooks: vec!["power_circuit".to_string()],
            ..Default::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 2"));
        assert!(toml_str.contains("debug = true"));
        assert!(toml_str.contains("power_circuit"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: CoreConfig = toml::from_str("debug = true").unwrap();
        assert!(config.debug);
        assert_eq!(config.signal_queue_capacity, DEFAULT_SIGNAL_QUEUE_CAPACITY);
        assert_eq!(config.filter_directive(), "debug");
    }

    #[test]
    fn test_log_filter_overrides_debug() {
        let config = CoreConfig {
            debug: true,
            log_filter: Some("finhook_core=trace".to_string()),
            ..Default::default()
        };
        assert_eq!(config.filter_directive(), "finhook_core=trace");
        assert!(!config.is_hook_disabled("train"));
    }

    #[test]
    fn test_save_and_load_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join(format!("finhook-config-{}", std::process::id()));
        let path = dir.join("configs").join("core.toml");
        let config = CoreConfig {
            signal_queue_capacity: 16,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        let loaded = CoreConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
