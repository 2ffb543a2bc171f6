use std::fmt;
use std::path::PathBuf;

use crate::mod_tree::{ModId, ModInfo};
use crate::plugin_system::PluginId;

/// Run-wide file number, shared by every mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub(crate) u64);

impl FileId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a plugin gets to see about a file or directory inside a mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub file_id: FileId,
    pub mod_id: ModId,
    pub mod_name: String,
    /// Absolute path of the mod directory
    pub mod_path: PathBuf,
    /// Last path component
    pub name: String,
    /// Path relative to the mod directory
    pub path: PathBuf,
    pub full_path: PathBuf,
    /// Lowercase, without the dot; empty when there is none
    pub extension: String,
    pub is_dir: bool,
    /// Whether the walk will descend into this entry
    pub recursion: bool,
}

/// A resolved file kept by the tree until installation is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: FileId,
    /// Parent mod, looked up through the tree
    pub mod_id: ModId,
    pub handler: PluginId,
    pub name: String,
    pub path: PathBuf,
    pub full_path: PathBuf,
    pub extension: String,
    pub is_dir: bool,
    pub recursion: bool,
}

impl FileRecord {
    pub fn new(descriptor: &FileDescriptor, handler: PluginId) -> Self {
        Self {
            id: descriptor.file_id,
            mod_id: descriptor.mod_id,
            handler,
            name: descriptor.name.clone(),
            path: descriptor.path.clone(),
            full_path: descriptor.full_path.clone(),
            extension: descriptor.extension.clone(),
            is_dir: descriptor.is_dir,
            recursion: descriptor.recursion,
        }
    }

    /// Rebuild the descriptor handed to the plugin at install time.
    pub fn descriptor(&self, parent: &ModInfo) -> FileDescriptor {
        FileDescriptor {
            file_id: self.id,
            mod_id: self.mod_id,
            mod_name: parent.name.clone(),
            mod_path: parent.path.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            full_path: self.full_path.clone(),
            extension: self.extension.clone(),
            is_dir: self.is_dir,
            recursion: self.recursion,
        }
    }
}
