//! # Mod Tree
//!
//! Mods found under the mod root and the files resolved inside them.
//!
//! The tree only resolves: it asks the plugin registry who handles each
//! entry and records the answer. Installation happens later, over
//! [`ModTree::files`]. The whole tree is dropped by [`ModTree::clear`] once a
//! run is over; mod and file numbers keep counting across runs.
mod file;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use file::{FileDescriptor, FileId, FileRecord};

use crate::plugin_system::{PluginRegistry, resolve};
use crate::utils::CurrentDirGuard;
use crate::utils::fs::extension_of;

/// Sequential mod number, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModId(pub(crate) u32);

impl ModId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A top-level directory under the mod root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
    pub id: ModId,
    pub name: String,
    pub path: PathBuf,
    /// Resolved files, in walk order
    pub files: Vec<FileId>,
}

#[derive(Debug, Default)]
pub struct ModTree {
    mods: Vec<ModInfo>,
    files: Vec<FileRecord>,
    next_mod_id: u32,
    next_file_id: u64,
    excluded: Vec<String>,
}

impl ModTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mod directory names to skip (case-insensitive).
    pub fn with_excluded(mut self, excluded: Vec<String>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Register every immediate subdirectory of `root` as a mod.
    ///
    /// Directories starting with a dot and excluded names are skipped. Mods
    /// come in directory enumeration order.
    pub fn discover(&mut self, root: &Path) -> io::Result<Vec<ModId>> {
        let mut discovered = Vec::new();

        for entry in fs::read_dir(root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read an entry of \"{}\": {}", root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if self.excluded.iter().any(|excluded| excluded.eq_ignore_ascii_case(&name)) {
                log::info!("Skipping excluded mod \"{}\"", name);
                continue;
            }

            let id = ModId(self.next_mod_id);
            self.next_mod_id += 1;
            log::info!("Found mod \"{}\" (id {})", name, id);

            self.mods.push(ModInfo {
                id,
                name,
                path,
                files: Vec::new(),
            });
            discovered.push(id);
        }

        Ok(discovered)
    }

    /// Walk a mod and resolve every entry in it. Returns the number of
    /// entries that found a handler.
    ///
    /// A directory claimed by a plugin is not descended into, and neither is a
    /// symbolic link to a directory. Unreadable
    /// subdirectories are logged and skipped; only a mod directory that cannot
    /// be entered or listed fails the call.
    pub fn populate(&mut self, mod_id: ModId, registry: &mut PluginRegistry) -> io::Result<usize> {
        let (name, path) = self
            .get(mod_id)
            .map(|m| (m.name.clone(), m.path.clone()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no mod with id {}", mod_id)))?;

        log::info!("Walking mod \"{}\"", name);
        let _cwd = CurrentDirGuard::enter(&path)?;

        let walk = Walk {
            mod_id,
            mod_name: &name,
            mod_path: &path,
        };
        let mut records = Vec::new();
        self.walk_dir(&walk, Path::new(""), registry, &mut records)?;

        let resolved = records.len();
        if let Some(info) = self.mods.iter_mut().find(|m| m.id == mod_id) {
            info.files.extend(records.iter().map(|r| r.id));
        }
        self.files.extend(records);
        Ok(resolved)
    }

    fn walk_dir(
        &mut self,
        walk: &Walk<'_>,
        relative_dir: &Path,
        registry: &mut PluginRegistry,
        records: &mut Vec<FileRecord>,
    ) -> io::Result<()> {
        let dir = walk.mod_path.join(relative_dir);

        for entry in fs::read_dir(&dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read an entry of \"{}\": {}", dir.display(), e);
                    continue;
                }
            };

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    log::warn!("Failed to stat \"{}\": {}", entry.path().display(), e);
                    continue;
                }
            };
            let file_name = entry.file_name();
            let full_path = entry.path();
            // A symlinked directory is offered to plugins but never walked
            let is_dir = if file_type.is_symlink() {
                full_path.is_dir()
            } else {
                file_type.is_dir()
            };

            let mut descriptor = FileDescriptor {
                file_id: self.allocate_file_id(),
                mod_id: walk.mod_id,
                mod_name: walk.mod_name.to_string(),
                mod_path: walk.mod_path.to_path_buf(),
                path: relative_dir.join(&file_name),
                extension: extension_of(&full_path),
                name: file_name.to_string_lossy().into_owned(),
                full_path,
                is_dir,
                recursion: file_type.is_dir(),
            };

            if let Some(handler) = resolve(registry, &descriptor).handler {
                descriptor.recursion = false;
                records.push(FileRecord::new(&descriptor, handler));
            }

            if descriptor.is_dir && descriptor.recursion {
                if let Err(e) = self.walk_dir(walk, &descriptor.path, registry, records) {
                    log::warn!("Failed to walk \"{}\": {}", descriptor.full_path.display(), e);
                }
            }
        }

        Ok(())
    }

    fn allocate_file_id(&mut self) -> FileId {
        let id = FileId(self.next_file_id);
        self.next_file_id += 1;
        id
    }

    pub fn get(&self, id: ModId) -> Option<&ModInfo> {
        self.mods.iter().find(|m| m.id == id)
    }

    pub fn mods(&self) -> &[ModInfo] {
        &self.mods
    }

    /// Every resolved file of the run, in resolution order.
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Resolved files of one mod.
    pub fn files_of(&self, id: ModId) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(move |f| f.mod_id == id)
    }

    /// Descriptor of a resolved file, as handed to its plugin.
    pub fn descriptor(&self, record: &FileRecord) -> Option<FileDescriptor> {
        self.get(record.mod_id).map(|parent| record.descriptor(parent))
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Drop every mod and file of the run. Numbering continues where it stopped.
    pub fn clear(&mut self) {
        self.mods.clear();
        self.files.clear();
    }
}

struct Walk<'a> {
    mod_id: ModId,
    mod_name: &'a str,
    mod_path: &'a Path,
}

#[cfg(test)]
mod tests;
