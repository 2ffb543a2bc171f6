use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::{TempDir, tempdir};

use crate::kernel::bootstrap::ModLoader;
use crate::kernel::error::KernelLifecyclePhase;
use crate::plugin_system::tests::mocks::{Accept, MockPlugin, Tracker, events, loader_with, tracker};
use crate::storage::{DirectoryLayout, LoaderConfig};

/// game/modloader/mod1/{readme.txt, data.bin, models/car.dff}
pub(crate) fn game_dir() -> TempDir {
    let game = tempdir().unwrap();
    let mod1 = game.path().join("modloader/mod1");
    fs::create_dir_all(mod1.join("models")).unwrap();
    fs::write(mod1.join("readme.txt"), "readme").unwrap();
    fs::write(mod1.join("data.bin"), [1u8, 2, 3]).unwrap();
    fs::write(mod1.join("models/car.dff"), "dff").unwrap();
    game
}

pub(crate) fn plugins(t: &Tracker) -> Vec<MockPlugin> {
    vec![
        MockPlugin::new("catchall", 10, t).accept(Accept::Any),
        MockPlugin::new("text", 60, t).extensions(&["txt"]),
        MockPlugin::new("dirs", 30, t).accept(Accept::DirNamed("models".to_string())),
    ]
}

pub(crate) fn mod_loader(game: &TempDir, plugins: Vec<MockPlugin>, config: LoaderConfig) -> ModLoader {
    let layout = DirectoryLayout::with_default_root(game.path()).unwrap();
    ModLoader::new(layout, config, Box::new(loader_with(plugins)))
}

fn with_prefix<'a>(events: &'a [String], marker: &str) -> Vec<&'a str> {
    events.iter().filter(|e| e.contains(marker)).map(String::as_str).collect()
}

#[test]
#[serial]
fn test_full_pipeline() {
    let game = game_dir();
    let t = tracker();
    let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());

    assert!(loader.startup().unwrap());
    assert!(loader.is_working());

    let report = loader.last_report().clone();
    assert_eq!(report.plugins_loaded, 3);
    assert_eq!(report.mods, 1);
    assert_eq!(report.files_resolved, 3);
    assert_eq!(report.files_installed, 3);
    assert_eq!(report.install_failures, 0);
    assert!(report.resolutions.is_empty());

    let events = events(&t);
    assert_eq!(
        with_prefix(&events, ":startup"),
        vec!["text:startup", "dirs:startup", "catchall:startup"]
    );
    let mut installs = with_prefix(&events, ":install:");
    installs.sort();
    assert_eq!(
        installs,
        vec!["catchall:install:data.bin", "dirs:install:models", "text:install:readme.txt"]
    );
    assert_eq!(
        with_prefix(&events, ":post_process"),
        vec!["text:post_process", "dirs:post_process", "catchall:post_process"]
    );
    assert!(events.iter().all(|e| !e.contains("car.dff")));

    // Transient data is gone, plugins stay
    assert!(loader.mod_tree().is_empty());
    assert_eq!(loader.registry().len(), 3);

    // Every install happened after the whole search
    let last_check = events.iter().rposition(|e| e.contains(":check:")).unwrap();
    let first_install = events.iter().position(|e| e.contains(":install:")).unwrap();
    assert!(last_check < first_install);

    loader.shutdown().unwrap();
}

#[test]
#[serial]
fn test_data_dirs_and_log_are_created() {
    let game = game_dir();
    let t = tracker();
    let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());

    loader.startup().unwrap();
    let layout = loader.layout().clone();
    assert!(layout.plugins_dir().is_dir());
    assert!(layout.cache_dir().is_dir());
    loader.shutdown().unwrap();

    let log = fs::read_to_string(layout.log_file()).unwrap();
    assert!(log.starts_with("==== modloader"));
    assert!(log.contains("Logging finished."));
}

#[test]
#[serial]
fn test_shutdown_is_idempotent() {
    let game = game_dir();
    let t = tracker();
    let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());

    assert!(loader.shutdown().is_ok());
    loader.startup().unwrap();
    assert!(loader.shutdown().is_ok());
    assert!(loader.shutdown().is_ok());

    assert!(!loader.is_working());
    assert!(loader.registry().is_empty());
    assert_eq!(
        with_prefix(&events(&t), ":shutdown"),
        vec!["text:shutdown", "dirs:shutdown", "catchall:shutdown"]
    );
}

#[test]
#[serial]
fn test_startup_twice_is_a_noop() {
    let game = game_dir();
    let t = tracker();
    let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());

    assert!(loader.startup().unwrap());
    assert!(!loader.startup().unwrap());
    assert_eq!(with_prefix(&events(&t), ":startup").len(), 3);
}

#[test]
#[serial]
fn test_missing_root_aborts_startup() {
    let game = tempdir().unwrap();
    let t = tracker();
    let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());

    let error = loader.startup().unwrap_err();

    assert_eq!(error.phase(), Some(KernelLifecyclePhase::Bootstrap));
    assert!(!loader.is_working());
    assert!(events(&t).is_empty());

    // Startup can be retried once the root exists
    fs::create_dir(game.path().join("modloader")).unwrap();
    assert!(loader.startup().unwrap());
    assert!(loader.is_working());
}

#[test]
#[serial]
fn test_dry_run_installs_nothing() {
    let game = game_dir();
    let t = tracker();
    let config = LoaderConfig {
        dry_run: true,
        ..LoaderConfig::default()
    };
    let mut loader = mod_loader(&game, plugins(&t), config);

    loader.startup().unwrap();

    let events = events(&t);
    assert!(with_prefix(&events, ":install:").is_empty());
    assert!(with_prefix(&events, ":post_process").is_empty());

    let mut resolutions = loader.last_report().resolutions.clone();
    resolutions.sort();
    assert_eq!(
        resolutions,
        vec![
            ("mod1".to_string(), PathBuf::from("data.bin"), "catchall".to_string()),
            ("mod1".to_string(), PathBuf::from("models"), "dirs".to_string()),
            ("mod1".to_string(), PathBuf::from("readme.txt"), "text".to_string()),
        ]
    );
    assert_eq!(loader.last_report().files_installed, 0);
}

#[test]
#[serial]
fn test_install_failure_does_not_stop_the_run() {
    let game = game_dir();
    let t = tracker();
    let mut plugins = plugins(&t);
    plugins[1].fail_install = true;
    let mut loader = mod_loader(&game, plugins, LoaderConfig::default());

    loader.startup().unwrap();

    let report = loader.last_report();
    assert_eq!(report.install_failures, 1);
    assert_eq!(report.files_installed, 2);
    assert_eq!(with_prefix(&events(&t), ":post_process").len(), 3);
}

#[test]
#[serial]
fn test_config_priority_override_disables_plugin() {
    let game = game_dir();
    let t = tracker();
    let config = LoaderConfig {
        plugin_priorities: HashMap::from([("Text".to_string(), 0)]),
        ..LoaderConfig::default()
    };
    let mut loader = mod_loader(&game, plugins(&t), config);

    loader.startup().unwrap();

    let events = events(&t);
    assert!(events.iter().all(|e| !e.starts_with("text:")));
    assert!(events.contains(&"catchall:install:readme.txt".to_string()));
    assert_eq!(loader.registry().len(), 2);
}

#[test]
#[serial]
fn test_excluded_mod_is_not_walked() {
    let game = game_dir();
    let t = tracker();
    let config = LoaderConfig {
        excluded_mods: vec!["MOD1".to_string()],
        ..LoaderConfig::default()
    };
    let mut loader = mod_loader(&game, plugins(&t), config);

    loader.startup().unwrap();

    assert_eq!(loader.last_report().mods, 0);
    assert!(with_prefix(&events(&t), ":check:").is_empty());
}

#[test]
#[serial]
fn test_working_directory_is_restored() {
    let game = game_dir();
    let t = tracker();
    let before = std::env::current_dir().unwrap();
    let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());

    loader.startup().unwrap();
    assert_eq!(std::env::current_dir().unwrap(), before);
    loader.shutdown().unwrap();
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial]
fn test_drop_shuts_down() {
    let game = game_dir();
    let t = tracker();
    {
        let mut loader = mod_loader(&game, plugins(&t), LoaderConfig::default());
        loader.startup().unwrap();
    }

    assert_eq!(with_prefix(&events(&t), ":shutdown").len(), 3);
}
