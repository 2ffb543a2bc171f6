use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::kernel::host::HostContext;
use crate::mod_tree::FileDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::extension_index::ExtensionIndex;
use crate::plugin_system::isolation::isolate;
use crate::plugin_system::loader::{LoadedModule, ModuleLoader};
use crate::plugin_system::traits::{CheckResult, Plugin, PluginError, PluginInfo};
use crate::plugin_system::version::PluginVersion;

/// Identifies a plugin within one registry. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginId(u64);

impl PluginId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered plugin together with the module it came from.
pub struct PluginEntry {
    id: PluginId,
    info: PluginInfo,
    module_path: PathBuf,
    started: bool,
    checked: bool,
    // Declared before `module` so the plugin is dropped before its code is unmapped
    plugin: Box<dyn Plugin>,
    module: Option<Box<dyn LoadedModule>>,
}

impl PluginEntry {
    pub fn id(&self) -> PluginId {
        self.id
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Effective priority, after configuration overrides.
    pub fn priority(&self) -> i32 {
        self.info.priority
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the plugin was already asked about the file being resolved.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    /// The module the plugin was loaded from.
    pub fn module(&self) -> Option<&dyn LoadedModule> {
        self.module.as_deref()
    }

    /// Extensions the plugin declares interest in. A panicking plugin declares none.
    pub fn handled_extensions(&self) -> Vec<String> {
        isolate(&self.info.name, "handled_extensions", || self.plugin.handled_extensions()).unwrap_or_else(|e| {
            log::error!("{}", e);
            Vec::new()
        })
    }

    /// Run the interest test unless this plugin was already asked.
    ///
    /// Marks the plugin as checked. Returns true only for an affirmative answer;
    /// a panicking test counts as a refusal.
    pub(crate) fn test_interest(&mut self, file: &FileDescriptor) -> bool {
        if self.checked {
            return false;
        }
        self.checked = true;

        let plugin = &self.plugin;
        match isolate(&self.info.name, "check_file", || plugin.check_file(file)) {
            Ok(answer) => answer == CheckResult::Yes,
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    pub(crate) fn clear_checked(&mut self) {
        self.checked = false;
    }

    fn run_hook(
        &mut self,
        hook: &'static str,
        f: impl FnOnce(&mut dyn Plugin) -> Result<(), PluginError>,
    ) -> Result<(), PluginSystemError> {
        let plugin = self.plugin.as_mut();
        match isolate(&self.info.name, hook, || f(plugin)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PluginSystemError::LifecycleHook {
                plugin: self.info.name.clone(),
                hook,
                message: e.to_string(),
            }),
            Err(panicked) => Err(panicked),
        }
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("module_path", &self.module_path)
            .field("started", &self.started)
            .field("checked", &self.checked)
            .finish()
    }
}

/// Owns every loaded plugin, ordered by descending priority.
///
/// Plugins of equal priority keep their load order. The extension index is
/// rebuilt after every change of membership.
pub struct PluginRegistry {
    host_version: PluginVersion,
    pub(crate) entries: Vec<PluginEntry>,
    pub(crate) index: ExtensionIndex,
    next_id: u64,
    priority_overrides: HashMap<String, i32>,
}

impl PluginRegistry {
    pub fn new(host_version: PluginVersion) -> Self {
        Self {
            host_version,
            entries: Vec::new(),
            index: ExtensionIndex::default(),
            next_id: 1,
            priority_overrides: HashMap::new(),
        }
    }

    /// Priorities to force at load time, keyed by plugin name (case-insensitive).
    pub fn with_priority_overrides(mut self, overrides: HashMap<String, i32>) -> Self {
        self.set_priority_overrides(overrides);
        self
    }

    pub fn set_priority_overrides(&mut self, overrides: HashMap<String, i32>) {
        self.priority_overrides = overrides
            .into_iter()
            .map(|(name, priority)| (name.to_lowercase(), priority))
            .collect();
    }

    pub fn host_version(&self) -> PluginVersion {
        self.host_version
    }

    /// Open a module and register the plugin it exports, without starting it.
    ///
    /// The module is released again when it exports no plugin, when the plugin
    /// is too new for the host or when it is disabled.
    pub fn load_module(&mut self, loader: &dyn ModuleLoader, path: &Path) -> Result<PluginId, PluginSystemError> {
        let module = loader.load(path)?;
        let plugin = module
            .entry_point()
            .ok_or_else(|| PluginSystemError::MetadataMissing { path: path.to_path_buf() })?;

        let label = path.display().to_string();
        let mut info = isolate(&label, "info", || plugin.info())?;

        if let Some(priority) = self.priority_overrides.get(&info.name.to_lowercase()) {
            log::debug!("Priority of plugin '{}' overridden: {} -> {}", info.name, info.priority, priority);
            info.priority = *priority;
        }

        if !info.version.is_supported_by(&self.host_version) {
            return Err(PluginSystemError::VersionIncompatible {
                plugin: info.name,
                path: path.to_path_buf(),
                declared: info.version,
                host: self.host_version,
            });
        }

        if info.priority == 0 {
            return Err(PluginSystemError::PluginDisabled {
                plugin: info.name,
                path: path.to_path_buf(),
            });
        }

        let id = PluginId(self.next_id);
        self.next_id += 1;

        log::info!(
            "Loaded plugin \"{}\" version {} by {} (priority {}) from \"{}\"",
            info.name,
            info.version,
            info.author,
            info.priority,
            path.display()
        );

        self.entries.push(PluginEntry {
            id,
            info,
            module_path: path.to_path_buf(),
            started: false,
            checked: false,
            plugin,
            module: Some(module),
        });
        self.reorder();
        Ok(id)
    }

    /// Load a plugin and run its startup hook right away.
    ///
    /// A failing startup hook is logged; the plugin stays registered.
    pub fn load(&mut self, loader: &dyn ModuleLoader, path: &Path, host: &HostContext) -> Result<PluginId, PluginSystemError> {
        let id = self.load_module(loader, path)?;
        if let Err(e) = self.start(id, host) {
            log::error!("{}", e);
        }
        Ok(id)
    }

    /// Load every module found in `dir`. Returns how many plugins were registered.
    pub fn load_directory(&mut self, loader: &dyn ModuleLoader, dir: &Path) -> usize {
        log::info!("Loading plugins from \"{}\"", dir.display());

        let modules = match loader.discover(dir) {
            Ok(modules) => modules,
            Err(e) => {
                log::error!("Failed to list plugins in \"{}\": {}", dir.display(), e);
                return 0;
            }
        };

        let mut loaded = 0;
        for path in modules {
            match self.load_module(loader, &path) {
                Ok(_) => loaded += 1,
                Err(e @ PluginSystemError::PluginDisabled { .. }) => log::info!("{}", e),
                Err(e) => log::error!("{}", e),
            }
        }
        loaded
    }

    /// Run the startup hook of one plugin. Each plugin is started at most once.
    pub fn start(&mut self, id: PluginId, host: &HostContext) -> Result<(), PluginSystemError> {
        let entry = self.entry_mut(id)?;
        if entry.started {
            return Ok(());
        }
        entry.started = true;
        log::debug!("Starting plugin \"{}\"", entry.info.name);
        entry.run_hook("startup", |plugin| plugin.startup(host))
    }

    /// Start every plugin not started yet. Returns the number of failed hooks.
    pub fn start_all(&mut self, host: &HostContext) -> usize {
        let pending: Vec<PluginId> = self.entries.iter().filter(|e| !e.started).map(|e| e.id).collect();
        let mut failures = 0;
        for id in pending {
            if let Err(e) = self.start(id, host) {
                log::error!("{}", e);
                failures += 1;
            }
        }
        failures
    }

    /// Shut down and release one plugin. Returns false when it was not registered.
    pub fn unload(&mut self, id: PluginId) -> bool {
        let Some(position) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(position);
        self.rebuild_index();
        Self::release(entry);
        true
    }

    /// Unload the plugin with the given name (case-insensitive).
    pub fn unload_by_name(&mut self, name: &str) -> Result<(), PluginSystemError> {
        let id = self
            .find_by_name(name)
            .map(PluginEntry::id)
            .ok_or_else(|| PluginSystemError::NotFound(name.to_string()))?;
        self.unload(id);
        Ok(())
    }

    /// Unload every plugin in registry order. A plugin failing to shut down
    /// does not keep the others from being unloaded.
    /// Returns the number of plugins whose shutdown failed.
    pub fn unload_all(&mut self) -> usize {
        let entries = std::mem::take(&mut self.entries);
        self.index.clear();
        entries.into_iter().map(Self::release).filter(|ok| !ok).count()
    }

    /// Tell every plugin the run is over. Returns the number of failed hooks.
    pub fn post_process_all(&mut self) -> usize {
        let mut failures = 0;
        for entry in &mut self.entries {
            if let Err(e) = entry.run_hook("post_process", |plugin| plugin.post_process()) {
                log::error!("{}", e);
                failures += 1;
            }
        }
        failures
    }

    /// Have plugin `id` install `file`.
    pub fn install(&mut self, id: PluginId, file: &FileDescriptor) -> Result<(), PluginSystemError> {
        let entry = self.entry_mut(id)?;
        let name = entry.info.name.clone();
        let plugin = entry.plugin.as_mut();

        let outcome = isolate(&name, "install_file", || plugin.install_file(file))?;
        outcome.map_err(|e| PluginSystemError::InstallFailed {
            plugin: name,
            file: file.full_path.clone(),
            message: e.to_string(),
        })
    }

    /// Plugins in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: PluginId) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| e.info.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> &ExtensionIndex {
        &self.index
    }

    /// Plugins indexed under `extension`, in resolution order.
    pub fn indexed_plugins(&self, extension: &str) -> Vec<PluginId> {
        self.index
            .candidates(extension)
            .iter()
            .filter_map(|slot| self.entries.get(*slot))
            .map(PluginEntry::id)
            .collect()
    }

    fn entry_mut(&mut self, id: PluginId) -> Result<&mut PluginEntry, PluginSystemError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| PluginSystemError::NotFound(id.to_string()))
    }

    fn reorder(&mut self) {
        // sort_by_key is stable: equal priorities keep their load order
        self.entries.sort_by_key(|e| std::cmp::Reverse(e.info.priority));
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = ExtensionIndex::build(&self.entries);
    }

    /// Shut a plugin down and drop it, then its module. Returns false when
    /// the shutdown hook failed.
    fn release(mut entry: PluginEntry) -> bool {
        log::info!("Unloading plugin \"{}\"", entry.info.name);
        let shutdown = entry.run_hook("shutdown", |plugin| plugin.shutdown());
        if let Err(e) = &shutdown {
            log::error!("{}", e);
        }

        let name = entry.info.name.clone();
        if let Err(e) = isolate(&name, "drop", move || drop(entry)) {
            log::error!("{}", e);
        }
        shutdown.is_ok()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(PluginVersion::host())
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("host_version", &self.host_version)
            .field("entries", &self.entries)
            .field("index", &self.index)
            .finish()
    }
}
