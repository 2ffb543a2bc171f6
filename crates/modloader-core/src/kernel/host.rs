use std::fmt;
use std::path::{Path, PathBuf};

use crate::kernel::constants;
use crate::plugin_system::PluginVersion;
use crate::storage::DirectoryLayout;

/// Handle given to plugins at startup.
///
/// Carries the directories a plugin may need and the same log and error
/// surface the loader itself uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    game_dir: PathBuf,
    root_dir: PathBuf,
    plugins_dir: PathBuf,
    cache_dir: PathBuf,
    version: PluginVersion,
}

impl HostContext {
    pub fn new(layout: &DirectoryLayout) -> Self {
        Self {
            game_dir: layout.game_dir().to_path_buf(),
            root_dir: layout.root_dir().to_path_buf(),
            plugins_dir: layout.plugins_dir().to_path_buf(),
            cache_dir: layout.cache_dir().to_path_buf(),
            version: PluginVersion::host(),
        }
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Directory reserved for plugin data; the loader never touches its content.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn version(&self) -> PluginVersion {
        self.version
    }

    /// Append a line to the loader log.
    pub fn log(&self, args: fmt::Arguments<'_>) {
        log::info!(target: "plugin", "{}", args);
    }

    /// Report an error to the user. The message is logged as well.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        log::error!(target: "plugin", "{}", args);
        eprintln!("{}: {}", constants::HOST_NAME, args);
    }
}
