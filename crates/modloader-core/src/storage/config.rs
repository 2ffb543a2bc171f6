use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Loader settings. Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Log level filter (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    /// When unset, `RUST_LOG` is honoured and `info` is the fallback.
    pub log_level: Option<String>,
    /// Write the log to stdout instead of the log file
    pub log_to_stdout: bool,
    /// Resolve everything but install nothing
    pub dry_run: bool,
    /// Mod directory names to skip during discovery
    pub excluded_mods: Vec<String>,
    /// Priority overrides keyed by plugin name; 0 disables the plugin
    pub plugin_priorities: HashMap<String, i32>,
}

impl LoaderConfig {
    /// Parse a config from a string in the given format
    pub fn from_str_with_format(content: &str, format: ConfigFormat, origin: &Path) -> Result<Self, StorageSystemError> {
        let deserialization = |e: Box<dyn std::error::Error + Send + Sync>| StorageSystemError::Deserialization {
            format: format.extension().to_string(),
            path: origin.to_path_buf(),
            source: e,
        };

        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| deserialization(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                // An empty YAML document deserializes to unit, not to a map
                if content.trim().is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str(content).map_err(|e| deserialization(Box::new(e)))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| deserialization(Box::new(e))),
        }
    }

    /// Load a config from a file; the format follows the file extension
    pub fn load(path: &Path) -> Result<Self, StorageSystemError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_config", path.to_path_buf()))?;
        Self::from_str_with_format(&content, format, path)
    }

    /// Look for a config file in `data_dir`. Returns the parsed config and the
    /// file it came from, or `None` when no candidate exists.
    pub fn discover(data_dir: &Path) -> Result<Option<(Self, PathBuf)>, StorageSystemError> {
        for name in constants::CONFIG_FILE_NAMES {
            let candidate = data_dir.join(name);
            if !candidate.is_file() {
                continue;
            }
            // Skip candidates whose format was compiled out
            if ConfigFormat::from_path(&candidate).is_none() {
                continue;
            }
            return Self::load(&candidate).map(|config| Some((config, candidate)));
        }
        Ok(None)
    }

    /// The configured level filter, `None` when no level was configured.
    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.log_level.as_ref().map(|level| {
            level.parse::<LevelFilter>().unwrap_or_else(|_| {
                eprintln!("{}: unknown log level '{}', using 'info'", constants::HOST_NAME, level);
                LevelFilter::Info
            })
        })
    }
}
