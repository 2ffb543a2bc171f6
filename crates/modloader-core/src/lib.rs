// Core of the modloader host: plugin registry, handler resolution, mod discovery
// and the fixed install pipeline driven by the loader.
pub mod kernel;
pub mod mod_tree;
pub mod plugin_system;
pub mod storage;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and plugins
pub use kernel::{HostContext, ModLoader, RunReport};
pub use kernel::error::Error as KernelError;
pub use mod_tree::{FileDescriptor, ModTree};
pub use plugin_system::{CheckResult, Plugin, PluginError, PluginInfo, PluginRegistry, PluginVersion};
pub use storage::{DirectoryLayout, LoaderConfig};
