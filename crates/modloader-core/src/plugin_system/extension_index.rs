use std::collections::HashMap;

use crate::plugin_system::registry::PluginEntry;
use crate::utils::normalize_extension;

/// Maps a file extension to the plugins that declared interest in it.
///
/// Buckets hold positions into the registry's plugin list and keep the
/// registry order, so candidates come out by descending priority with load
/// order breaking ties. The index is derived data: the registry rebuilds it
/// wholesale whenever its membership or order changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionIndex {
    buckets: HashMap<String, Vec<usize>>,
}

impl ExtensionIndex {
    /// Index the given plugins, which must already be in registry order.
    /// Disabled plugins (priority 0) are never indexed.
    pub fn build(entries: &[PluginEntry]) -> Self {
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

        for (slot, entry) in entries.iter().enumerate() {
            if entry.priority() == 0 {
                continue;
            }
            for extension in entry.handled_extensions() {
                let extension = normalize_extension(&extension);
                if extension.is_empty() {
                    continue;
                }
                let bucket = buckets.entry(extension).or_default();
                // A plugin listing the same extension twice is indexed once
                if bucket.last() != Some(&slot) {
                    bucket.push(slot);
                }
            }
        }

        log::debug!("Extension index rebuilt: {} extensions over {} plugins", buckets.len(), entries.len());
        Self { buckets }
    }

    /// Registry positions of the plugins indexed under `extension`.
    pub fn candidates(&self, extension: &str) -> &[usize] {
        self.buckets
            .get(&normalize_extension(extension))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every indexed extension, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.buckets.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Number of indexed extensions.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
