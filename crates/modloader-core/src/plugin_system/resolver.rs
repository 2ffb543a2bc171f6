//! Picks the plugin that will install a file.
//!
//! Resolution runs in two passes over the registry:
//!
//! 1. the extension index bucket of the file's extension, in priority order;
//! 2. every registered plugin in priority order, which always runs.
//!
//! Each plugin is asked at most once per file: asking marks it as checked. The
//! first affirmative answer wins. Once the second pass is over, every plugin's
//! checked mark is cleared, whether it was asked or not.
use crate::mod_tree::FileDescriptor;
use crate::plugin_system::registry::{PluginEntry, PluginId, PluginRegistry};

/// Which pass found the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    /// Found through the extension index
    Indexed,
    /// Found by the scan over every plugin
    Fallback,
}

/// Outcome of resolving one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub handler: Option<PluginId>,
    pub path: Option<ResolutionPath>,
}

impl Resolution {
    pub fn is_handled(&self) -> bool {
        self.handler.is_some()
    }

    fn found(handler: PluginId, path: ResolutionPath) -> Self {
        Self {
            handler: Some(handler),
            path: Some(path),
        }
    }
}

/// Find at most one plugin willing to install `file`.
pub fn resolve(registry: &mut PluginRegistry, file: &FileDescriptor) -> Resolution {
    let PluginRegistry { entries, index, .. } = registry;
    let mut resolution = Resolution::default();

    for &slot in index.candidates(&file.extension) {
        let Some(entry) = entries.get_mut(slot) else {
            continue;
        };
        if entry.test_interest(file) {
            resolution = Resolution::found(entry.id(), ResolutionPath::Indexed);
            break;
        }
    }

    for entry in entries.iter_mut() {
        if !resolution.is_handled() && entry.test_interest(file) {
            resolution = Resolution::found(entry.id(), ResolutionPath::Fallback);
        }
    }

    // Reset the whole set, not only the plugins asked above
    entries.iter_mut().for_each(PluginEntry::clear_checked);

    if let Some(handler) = resolution.handler {
        log::debug!("\"{}\" resolved to plugin {} ({:?})", file.path.display(), handler, resolution.path);
    }
    resolution
}
