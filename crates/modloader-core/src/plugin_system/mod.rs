//! # Modloader Plugin System
//!
//! Everything between a plugin module on disk and a file handed to that
//! plugin for installation.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] contract every handler implements, with
//!   [`PluginInfo`] metadata and [`CheckResult`] interest answers.
//! - **[`loader`]**: the [`ModuleLoader`](loader::ModuleLoader) interface that opens
//!   plugin modules, with native and statically linked implementations.
//! - **[`registry`]**: [`PluginRegistry`], which owns the loaded plugins in
//!   priority order and drives their lifecycle hooks.
//! - **[`extension_index`]**: [`ExtensionIndex`], the extension to candidates
//!   cache the registry rebuilds on every change.
//! - **[`resolver`]**: [`resolve`](resolver::resolve), choosing at most one handler per file.
//! - **[`isolation`]**: runs plugin callbacks so a panic stays contained to its plugin.
//! - **[`version`]**: [`PluginVersion`] and the host compatibility rule.
//! - **[`error`]**: [`PluginSystemError`].
pub mod error;
pub mod extension_index;
pub mod isolation;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod version;

pub use error::PluginSystemError;
pub use extension_index::ExtensionIndex;
pub use loader::{LoadedModule, ModuleLoader, NativeModuleLoader, PluginDeclaration, StaticModuleLoader};
pub use registry::{PluginEntry, PluginId, PluginRegistry};
pub use resolver::{Resolution, ResolutionPath, resolve};
pub use traits::{CheckResult, Plugin, PluginError, PluginInfo};
pub use version::PluginVersion;

// Test module declaration
#[cfg(test)]
pub(crate) mod tests;
