/// Host name, used in the log header and on the user-facing error surface
pub const HOST_NAME: &str = "modloader";

/// Host protocol version, major part. Plugins declaring a greater major are refused.
pub const HOST_VERSION_MAJOR: u32 = 0;

/// Host protocol version, minor part. Compared only when majors are equal.
pub const HOST_VERSION_MINOR: u32 = 2;

/// Host protocol version, revision part. Never a reason for refusal.
pub const HOST_VERSION_REVISION: u32 = 1;

/// Whether this is a development build (shown in the log header)
pub const HOST_VERSION_IS_DEV: bool = true;

/// Where updated builds are published
pub const PROJECT_URL: &str = "https://github.com/thelink2012/sa-modloader";

/// Default mod root directory name, relative to the game directory
pub const DEFAULT_ROOT_DIR_NAME: &str = "modloader";

/// Private data directory inside the mod root
pub const DATA_DIR_NAME: &str = ".data";

/// Plugins directory inside the data directory
pub const PLUGINS_DIR_NAME: &str = "plugins";

/// Cache directory inside the data directory, reserved for plugins
pub const CACHE_DIR_NAME: &str = "cache";

/// Log file name inside the data directory
pub const LOG_FILE_NAME: &str = "modloader.log";

/// Config file candidates inside the data directory, in lookup order
pub const CONFIG_FILE_NAMES: &[&str] = &["config.toml", "config.yaml", "config.yml", "config.json"];

/// Priority a plugin gets when it does not declare one
pub const DEFAULT_PLUGIN_PRIORITY: i32 = 50;

/// Name of the static every native plugin module exports
pub const PLUGIN_DECLARATION_SYMBOL: &[u8] = b"MODLOADER_PLUGIN\0";

/// ABI version native plugin modules must have been built against
pub const CORE_ABI_VERSION: &str = env!("CARGO_PKG_VERSION");
