//! # Modloader Plugin System Errors
//!
//! Defines [`PluginSystemError`], the error type of plugin loading, the
//! lifecycle hooks and installation.
//!
//! A file nobody claims is not an error: resolution simply returns no handler.
// crates/modloader-core/src/plugin_system/error.rs
use std::path::PathBuf;

use crate::plugin_system::version::PluginVersion;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Failed to load plugin module '{path}': {source}")]
    ModuleLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Plugin module '{path}' exposes no plugin entry point")]
    MetadataMissing { path: PathBuf },

    #[error("Plugin '{plugin}' ({path}) is version {declared}, which the host {host} cannot run")]
    VersionIncompatible {
        plugin: String,
        path: PathBuf,
        declared: PluginVersion,
        host: PluginVersion,
    },

    #[error("Plugin '{plugin}' ({path}) is disabled (priority 0)")]
    PluginDisabled { plugin: String, path: PathBuf },

    #[error("Plugin '{plugin}' failed to install '{file}': {message}")]
    InstallFailed {
        plugin: String,
        file: PathBuf,
        message: String,
    },

    #[error("Plugin '{plugin}' failed during {hook}: {message}")]
    LifecycleHook {
        plugin: String,
        hook: &'static str,
        message: String,
    },

    #[error("Plugin '{plugin}' panicked during {operation}: {message}")]
    Panicked {
        plugin: String,
        operation: String,
        message: String,
    },

    #[error("Plugin not found: {0}")]
    NotFound(String),
}

impl PluginSystemError {
    /// Name of the plugin the error is about, when there is one.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            PluginSystemError::VersionIncompatible { plugin, .. }
            | PluginSystemError::PluginDisabled { plugin, .. }
            | PluginSystemError::InstallFailed { plugin, .. }
            | PluginSystemError::LifecycleHook { plugin, .. }
            | PluginSystemError::Panicked { plugin, .. } => Some(plugin),
            PluginSystemError::NotFound(name) => Some(name),
            PluginSystemError::ModuleLoad { .. } | PluginSystemError::MetadataMissing { .. } => None,
        }
    }
}
