//! # Modloader Kernel Errors
//!
//! Defines the top-level error type of the loader.
//!
//! [`Error`] folds the subsystem errors ([`PluginSystemError`] and
//! [`StorageSystemError`]) together with failures tied to a specific
//! pipeline phase. Per-plugin and per-file failures never surface here during
//! a run: they are isolated and logged where they happen. What does reach the
//! caller is a failed bootstrap, which aborts startup.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

/// Error type of the modloader core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Error occurring during a specific loader lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// The phases of a loader run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("LoadPlugins")]
    LoadPlugins,
    #[error("StartupPlugins")]
    StartupPlugins,
    #[error("PerformSearch")]
    PerformSearch,
    #[error("HandleFiles")]
    HandleFiles,
    #[error("PostProcess")]
    PostProcess,
    #[error("ClearFilesData")]
    ClearFilesData,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wraps an error that aborted the bootstrap step.
    pub fn bootstrap(message: impl Into<String>, source: impl Into<Error>) -> Self {
        Error::KernelLifecycleError {
            phase: KernelLifecyclePhase::Bootstrap,
            message: message.into(),
            source: Some(Box::new(source.into())),
        }
    }

    /// The lifecycle phase this error belongs to, if any.
    pub fn phase(&self) -> Option<KernelLifecyclePhase> {
        match self {
            Error::KernelLifecycleError { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
