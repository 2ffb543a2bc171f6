use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::{TempDir, tempdir};

use crate::mod_tree::ModTree;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::tests::mocks::{Accept, MockPlugin, Tracker, events, loader_with, module, tracker};
use crate::plugin_system::version::PluginVersion;

/// root/
///   mod1/readme.txt, data.bin, models/car.dff, sub/nested.txt
///   mod2/notes.TXT
///   .data/plugins/
///   Skipped/
///   loose.txt
fn mod_root() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("mod1/models")).unwrap();
    fs::create_dir_all(root.join("mod1/sub")).unwrap();
    fs::create_dir_all(root.join("mod2")).unwrap();
    fs::create_dir_all(root.join(".data/plugins")).unwrap();
    fs::create_dir_all(root.join("Skipped")).unwrap();
    fs::write(root.join("mod1/readme.txt"), "hi").unwrap();
    fs::write(root.join("mod1/data.bin"), [0u8; 4]).unwrap();
    fs::write(root.join("mod1/models/car.dff"), "dff").unwrap();
    fs::write(root.join("mod1/sub/nested.txt"), "nested").unwrap();
    fs::write(root.join("mod2/notes.TXT"), "notes").unwrap();
    fs::write(root.join("loose.txt"), "loose").unwrap();
    dir
}

fn registry_with(t: &Tracker) -> PluginRegistry {
    let loader = loader_with(vec![
        MockPlugin::new("text", 60, t).extensions(&["txt"]),
        MockPlugin::new("models", 40, t).accept(Accept::DirNamed("models".to_string())),
    ]);
    let mut registry = PluginRegistry::new(PluginVersion::host());
    registry.load_module(&loader, module("text")).unwrap();
    registry.load_module(&loader, module("models")).unwrap();
    registry
}

fn sorted_paths(tree: &ModTree) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = tree.files().iter().map(|f| f.path.clone()).collect();
    paths.sort();
    paths
}

#[test]
fn test_discover_skips_dot_dirs_files_and_excluded() {
    let root = mod_root();
    let mut tree = ModTree::new().with_excluded(vec!["skipped".to_string()]);

    let ids = tree.discover(root.path()).unwrap();

    let mut names: Vec<&str> = tree.mods().iter().map(|m| m.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["mod1", "mod2"]);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
#[serial]
fn test_populate_resolves_without_installing() {
    let root = mod_root();
    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();

    for id in tree.discover(root.path()).unwrap() {
        tree.populate(id, &mut registry).unwrap();
    }

    assert_eq!(
        sorted_paths(&tree),
        vec![
            PathBuf::from("models"),
            PathBuf::from("notes.TXT"),
            PathBuf::from("readme.txt"),
            PathBuf::from("sub/nested.txt"),
        ]
    );
    assert!(events(&t).iter().all(|e| !e.contains(":install:")));
}

#[test]
#[serial]
fn test_claimed_directory_is_not_descended() {
    let root = mod_root();
    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();

    for id in tree.discover(root.path()).unwrap() {
        tree.populate(id, &mut registry).unwrap();
    }

    let models = tree.files().iter().find(|f| f.path == Path::new("models")).unwrap();
    assert!(models.is_dir);
    assert!(!models.recursion);
    assert_eq!(registry.get(models.handler).unwrap().name(), "models");
    assert!(events(&t).iter().all(|e| !e.contains("car.dff")));

    // An unclaimed directory is walked
    assert!(events(&t).iter().any(|e| e == "text:check:sub"));
    assert!(events(&t).iter().any(|e| e == "text:check:sub/nested.txt"));
}

#[test]
#[serial]
fn test_records_point_back_to_their_mod() {
    let root = mod_root();
    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();

    for id in tree.discover(root.path()).unwrap() {
        tree.populate(id, &mut registry).unwrap();
    }

    for info in tree.mods() {
        let files: Vec<_> = tree.files_of(info.id).map(|f| f.id).collect();
        assert_eq!(files, info.files);
        for record in tree.files_of(info.id) {
            let descriptor = tree.descriptor(record).unwrap();
            assert_eq!(descriptor.mod_name, info.name);
            assert_eq!(descriptor.full_path, info.path.join(&record.path));
        }
    }
}

#[test]
#[serial]
fn test_ids_are_monotonic_across_clear() {
    let root = mod_root();
    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();

    let first_mods = tree.discover(root.path()).unwrap();
    for id in &first_mods {
        tree.populate(*id, &mut registry).unwrap();
    }
    let first_files: Vec<_> = tree.files().iter().map(|f| f.id).collect();
    let mut sorted = first_files.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), first_files.len());

    tree.clear();
    assert!(tree.is_empty());
    assert!(tree.files().is_empty());

    let second_mods = tree.discover(root.path()).unwrap();
    for id in &second_mods {
        tree.populate(*id, &mut registry).unwrap();
    }

    let last_first_mod = first_mods.iter().max().unwrap();
    assert!(second_mods.iter().all(|id| id > last_first_mod));
    let last_first_file = first_files.iter().max().unwrap();
    assert!(tree.files().iter().all(|f| f.id > *last_first_file));
}

#[test]
#[serial]
fn test_populate_restores_working_directory() {
    let root = mod_root();
    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();
    let before = std::env::current_dir().unwrap();

    for id in tree.discover(root.path()).unwrap() {
        tree.populate(id, &mut registry).unwrap();
    }

    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial]
fn test_populate_unknown_mod_fails() {
    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();

    let unknown = crate::mod_tree::ModId(42);
    assert!(tree.populate(unknown, &mut registry).is_err());
}

#[cfg(unix)]
#[test]
#[serial]
fn test_non_utf8_directory_is_walked() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let odd = OsStr::from_bytes(b"sub\xff");
    let mod1 = dir.path().join("mod1");
    fs::create_dir_all(mod1.join(odd)).unwrap();
    fs::write(mod1.join("top.txt"), "top").unwrap();
    fs::write(mod1.join(odd).join("nested.txt"), "nested").unwrap();

    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();
    for id in tree.discover(dir.path()).unwrap() {
        tree.populate(id, &mut registry).unwrap();
    }

    assert_eq!(sorted_paths(&tree), vec![Path::new(odd).join("nested.txt"), PathBuf::from("top.txt")]);
    for record in tree.files() {
        assert!(tree.descriptor(record).unwrap().full_path.is_file());
    }
}

#[cfg(unix)]
#[test]
#[serial]
fn test_symlinked_directory_is_not_walked() {
    let dir = tempdir().unwrap();
    let mod1 = dir.path().join("mod1");
    fs::create_dir_all(mod1.join("a")).unwrap();
    fs::write(mod1.join("readme.txt"), "hi").unwrap();
    std::os::unix::fs::symlink(&mod1, mod1.join("a/loop")).unwrap();

    let t = tracker();
    let mut registry = registry_with(&t);
    let mut tree = ModTree::new();
    for id in tree.discover(dir.path()).unwrap() {
        tree.populate(id, &mut registry).unwrap();
    }

    assert_eq!(sorted_paths(&tree), vec![PathBuf::from("readme.txt")]);
    // The link itself is still offered as a directory
    assert!(events(&t).iter().any(|e| e == "text:check:a/loop"));
    assert!(events(&t).iter().all(|e| !e.starts_with("text:check:a/loop/")));
}
