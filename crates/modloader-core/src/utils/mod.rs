pub mod fs;

pub use fs::{CurrentDirGuard, normalize_extension};

use std::path::Path;

/// Create a directory and all of its parents if they are missing
pub fn create_dir_all<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
