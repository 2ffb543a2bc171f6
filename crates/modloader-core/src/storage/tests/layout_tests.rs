use std::fs;

use tempfile::tempdir;

use crate::storage::error::StorageSystemError;
use crate::storage::layout::DirectoryLayout;

#[test]
fn test_layout_paths() {
    let dir = tempdir().unwrap();
    let layout = DirectoryLayout::with_default_root(dir.path()).unwrap();

    assert_eq!(layout.game_dir(), dir.path());
    assert_eq!(layout.root_dir(), dir.path().join("modloader"));
    assert_eq!(layout.data_dir(), dir.path().join("modloader/.data"));
    assert_eq!(layout.plugins_dir(), dir.path().join("modloader/.data/plugins"));
    assert_eq!(layout.cache_dir(), dir.path().join("modloader/.data/cache"));
    assert_eq!(layout.log_file(), dir.path().join("modloader/.data/modloader.log"));
}

#[test]
fn test_missing_root_is_not_created() {
    let dir = tempdir().unwrap();
    let layout = DirectoryLayout::new(dir.path(), "mods").unwrap();

    assert!(matches!(layout.validate(), Err(StorageSystemError::DirectoryNotFound(_))));
    assert!(matches!(layout.ensure(), Err(StorageSystemError::DirectoryNotFound(_))));
    assert!(!layout.root_dir().exists());
}

#[test]
fn test_root_that_is_a_file_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("modloader"), "not a directory").unwrap();
    let layout = DirectoryLayout::with_default_root(dir.path()).unwrap();

    assert!(layout.validate().is_err());
}

#[test]
fn test_ensure_creates_data_dirs_once() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("modloader")).unwrap();
    let layout = DirectoryLayout::with_default_root(dir.path()).unwrap();

    let created = layout.ensure().unwrap();
    assert_eq!(created.len(), 3);
    assert!(layout.plugins_dir().is_dir());
    assert!(layout.cache_dir().is_dir());

    assert!(layout.ensure().unwrap().is_empty());
}
