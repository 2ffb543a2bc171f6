use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// Switches the process working directory and switches it back on drop.
///
/// The previous directory is restored on every exit path, unwinding included.
/// Guards nest: inner guards restore to whatever the outer guard set.
#[derive(Debug)]
pub struct CurrentDirGuard {
    previous: PathBuf,
}

impl CurrentDirGuard {
    /// Enter `path`, remembering the current directory.
    pub fn enter(path: impl AsRef<Path>) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(path.as_ref())?;
        log::trace!("Entered directory \"{}\"", path.as_ref().display());
        Ok(Self { previous })
    }

    /// The directory that will be restored.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            log::error!("Failed to restore working directory \"{}\": {}", self.previous.display(), e);
        }
    }
}

/// Lowercase an extension and strip any leading dots.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// Normalised extension of a path, empty when it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .map(normalize_extension)
        .unwrap_or_default()
}
