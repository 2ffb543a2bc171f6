use std::io;
use std::path::{Path, PathBuf};

use crate::kernel::constants;
use crate::storage::error::StorageSystemError;
use crate::utils::create_dir_all;

/// Paths the loader works with, all absolute.
///
/// ```text
/// <game>/
///   modloader/            root_dir, one subdirectory per mod
///     .data/              data_dir
///       plugins/          plugins_dir
///       cache/            cache_dir
///       modloader.log     log_file
///     some-mod/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    game_dir: PathBuf,
    root_dir: PathBuf,
    data_dir: PathBuf,
    plugins_dir: PathBuf,
    cache_dir: PathBuf,
    log_file: PathBuf,
}

impl DirectoryLayout {
    /// Build the layout below `game_dir`, using `root_name` as the mod root.
    /// Relative game directories are made absolute against the current directory.
    pub fn new(game_dir: impl AsRef<Path>, root_name: &str) -> io::Result<Self> {
        let game_dir = std::path::absolute(game_dir.as_ref())?;
        let root_dir = game_dir.join(root_name);
        let data_dir = root_dir.join(constants::DATA_DIR_NAME);

        Ok(Self {
            plugins_dir: data_dir.join(constants::PLUGINS_DIR_NAME),
            cache_dir: data_dir.join(constants::CACHE_DIR_NAME),
            log_file: data_dir.join(constants::LOG_FILE_NAME),
            game_dir,
            root_dir,
            data_dir,
        })
    }

    /// Layout with the default root directory name.
    pub fn with_default_root(game_dir: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(game_dir, constants::DEFAULT_ROOT_DIR_NAME)
    }

    /// Fails when the mod root is missing or is not a directory.
    pub fn validate(&self) -> Result<(), StorageSystemError> {
        if self.root_dir.is_dir() {
            Ok(())
        } else {
            Err(StorageSystemError::DirectoryNotFound(self.root_dir.clone()))
        }
    }

    /// Creates the data, plugins and cache directories when missing.
    /// Returns the directories that had to be created.
    pub fn ensure(&self) -> Result<Vec<PathBuf>, StorageSystemError> {
        self.validate()?;

        let mut created = Vec::new();
        for dir in [&self.data_dir, &self.plugins_dir, &self.cache_dir] {
            if dir.is_dir() {
                continue;
            }
            create_dir_all(dir).map_err(|e| StorageSystemError::io(e, "create_dir_all", dir.clone()))?;
            created.push(dir.clone());
        }
        Ok(created)
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}
