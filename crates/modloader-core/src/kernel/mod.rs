//! # Modloader Kernel
//!
//! The `kernel` module runs the loader. [`ModLoader`](bootstrap::ModLoader)
//! bootstraps the directory layout and the log, then drives the fixed phase
//! pipeline over the plugin registry and the mod tree.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Run orchestration**: [`ModLoader`] and its [`RunReport`], in `bootstrap`.
//! - **Plugin-facing handle**: [`HostContext`], in `host`.
//! - **Logging context**: [`LogContext`](logging::LogContext), the process-wide
//!   sink opened on startup and closed on shutdown.
//! - **Fault interception**: [`fault::guard`], which shuts the loader down when a
//!   panic escapes a guarded call.
//! - **Error Handling**: [`Error`](error::Error) and the `Result` alias.
//! - **Core Constants**: host name, version and directory names in `constants`.
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod fault;
pub mod host;
pub mod logging;

pub use bootstrap::{ModLoader, RunReport};
pub use error::{Error, Result};
pub use host::HostContext;
// Test module declaration
#[cfg(test)]
mod tests;
