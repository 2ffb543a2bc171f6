use std::io;

use crate::kernel::constants;
use crate::kernel::host::HostContext;
use crate::mod_tree::FileDescriptor;
use crate::plugin_system::version::PluginVersion;

/// Metadata a plugin reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: String,
    pub version: PluginVersion,
    pub author: String,
    /// Higher runs first; 0 disables the plugin.
    pub priority: i32,
}

impl Default for PluginInfo {
    fn default() -> Self {
        Self {
            name: "NONAME".to_string(),
            version: PluginVersion::default(),
            author: "NOAUTHOR".to_string(),
            priority: constants::DEFAULT_PLUGIN_PRIORITY,
        }
    }
}

impl PluginInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn version(mut self, version: PluginVersion) -> Self {
        self.version = version;
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Answer of a plugin's interest test. Only `Yes` claims the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Yes,
    No,
    Maybe,
}

/// Errors a plugin reports from its callbacks.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin chose not to handle the request
    #[error("declined: {0}")]
    Declined(String),

    #[error("{0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Capability contract of a handler plugin.
///
/// The host only routes file descriptors to plugins; how a file gets
/// installed is entirely up to the plugin.
pub trait Plugin: Send {
    /// Name, version, author and priority.
    fn info(&self) -> PluginInfo;

    /// Extensions (without the dot) this plugin commonly handles.
    ///
    /// Only used to find candidates faster; a plugin may still claim files
    /// of any other extension through [`Plugin::check_file`].
    fn handled_extensions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether this plugin wants to install `file`.
    ///
    /// Asked at most once per file per resolution.
    fn check_file(&self, file: &FileDescriptor) -> CheckResult;

    /// Install a file previously claimed by [`Plugin::check_file`].
    fn install_file(&mut self, file: &FileDescriptor) -> Result<(), PluginError>;

    /// Called once after the plugin is loaded.
    fn startup(&mut self, _host: &HostContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called after every install of a run completed.
    fn post_process(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called before the plugin is unloaded.
    fn shutdown(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
}
