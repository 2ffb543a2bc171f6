use std::path::{Path, PathBuf};

use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::host::HostContext;
use crate::kernel::logging::LogContext;
use crate::mod_tree::ModTree;
use crate::plugin_system::{ModuleLoader, PluginRegistry, PluginVersion};
use crate::storage::{DirectoryLayout, LoaderConfig, StorageSystemError};
use crate::utils::CurrentDirGuard;

/// Summary of the last run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub plugins_loaded: usize,
    pub mods: usize,
    pub files_resolved: usize,
    pub files_installed: usize,
    pub install_failures: usize,
    pub post_process_failures: usize,
    /// (mod, path inside the mod, plugin) for every resolved file; dry runs only
    pub resolutions: Vec<(String, PathBuf, String)>,
}

/// Drives a run: bootstrap, then load, start, search, install, post-process
/// and clear, in that order.
///
/// Every phase is best effort. Failures of single plugins or files are logged
/// and the run goes on; only a failed bootstrap aborts [`ModLoader::startup`].
pub struct ModLoader {
    layout: DirectoryLayout,
    config: LoaderConfig,
    module_loader: Box<dyn ModuleLoader>,
    registry: PluginRegistry,
    tree: ModTree,
    log: LogContext,
    host: Option<HostContext>,
    working: bool,
    report: RunReport,
}

impl ModLoader {
    pub fn new(layout: DirectoryLayout, config: LoaderConfig, module_loader: Box<dyn ModuleLoader>) -> Self {
        let registry =
            PluginRegistry::new(PluginVersion::host()).with_priority_overrides(config.plugin_priorities.clone());
        let tree = ModTree::new().with_excluded(config.excluded_mods.clone());

        Self {
            layout,
            config,
            module_loader,
            registry,
            tree,
            log: LogContext::new(),
            host: None,
            working: false,
            report: RunReport::default(),
        }
    }

    /// Bootstrap and run every phase.
    ///
    /// Returns `Ok(false)` when the loader is already working. A missing mod
    /// root or data directories that cannot be created fail the call and leave
    /// the loader stopped, so startup can be retried.
    pub fn startup(&mut self) -> Result<bool> {
        if self.working {
            log::debug!("Startup requested while already working");
            return Ok(false);
        }

        self.bootstrap()?;
        // From here on a fault must find something to shut down
        self.working = true;
        self.report = RunReport::default();

        self.load_plugins();
        self.startup_plugins();
        self.perform_search();
        self.handle_files();
        self.post_process();
        self.clear_files_data();

        log::info!(
            "Run finished: {} plugins, {} mods, {} files resolved, {} installed, {} failed",
            self.report.plugins_loaded,
            self.report.mods,
            self.report.files_resolved,
            self.report.files_installed,
            self.report.install_failures
        );
        Ok(true)
    }

    /// Unload every plugin and close the log.
    ///
    /// Safe to call at any point and any number of times; a loader that is
    /// not working has nothing to do.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.working {
            return Ok(());
        }
        // Cleared first so a fault inside shutdown does not shut down again
        self.working = false;

        log::info!("Shutting down");
        {
            let _cwd = enter_or_warn(self.layout.game_dir());
            let failures = self.registry.unload_all();
            if failures > 0 {
                log::warn!("{} plugins failed to shut down cleanly", failures);
            }
        }
        self.tree.clear();
        self.host = None;
        self.log.teardown();
        Ok(())
    }

    fn bootstrap(&mut self) -> Result<()> {
        self.layout
            .validate()
            .map_err(|e| Error::bootstrap("mod root is not usable", e))?;
        let created = self
            .layout
            .ensure()
            .map_err(|e| Error::bootstrap("failed to create the data directories", e))?;

        self.log.init(self.layout.log_file(), &self.config).map_err(|e| {
            let path = self.layout.log_file().to_path_buf();
            Error::bootstrap("failed to open the log", StorageSystemError::io(e, "open_log", path))
        })?;

        log::info!("Game directory: \"{}\"", self.layout.game_dir().display());
        for dir in [self.layout.data_dir(), self.layout.plugins_dir(), self.layout.cache_dir()] {
            log::info!("Making sure directory exists: \"{}\"", dir.display());
        }
        for dir in created {
            log::info!("Created directory \"{}\"", dir.display());
        }

        self.host = Some(HostContext::new(&self.layout));
        Ok(())
    }

    fn load_plugins(&mut self) {
        log_phase(KernelLifecyclePhase::LoadPlugins);
        let _cwd = enter_or_warn(self.layout.game_dir());

        let loaded = self
            .registry
            .load_directory(self.module_loader.as_ref(), self.layout.plugins_dir());
        self.report.plugins_loaded = self.registry.len();
        log::info!("{} plugins loaded, {} extensions indexed", loaded, self.registry.index().len());
    }

    fn startup_plugins(&mut self) {
        log_phase(KernelLifecyclePhase::StartupPlugins);
        let _cwd = enter_or_warn(self.layout.game_dir());

        if let Some(host) = self.host.as_ref() {
            let failures = self.registry.start_all(host);
            if failures > 0 {
                log::warn!("{} plugins failed to start", failures);
            }
        }
    }

    fn perform_search(&mut self) {
        log_phase(KernelLifecyclePhase::PerformSearch);
        let root = self.layout.root_dir().to_path_buf();
        let Some(_cwd) = enter_or_warn(&root) else {
            return;
        };

        let mods = match self.tree.discover(&root) {
            Ok(mods) => mods,
            Err(e) => {
                log::error!("Failed to list mods in \"{}\": {}", root.display(), e);
                return;
            }
        };

        self.report.mods = mods.len();
        for id in mods {
            match self.tree.populate(id, &mut self.registry) {
                Ok(resolved) => self.report.files_resolved += resolved,
                Err(e) => log::error!("Failed to walk mod {}: {}", id, e),
            }
        }
    }

    fn handle_files(&mut self) {
        log_phase(KernelLifecyclePhase::HandleFiles);
        let _cwd = enter_or_warn(self.layout.game_dir());

        for record in self.tree.files() {
            let Some(file) = self.tree.descriptor(record) else {
                continue;
            };
            let plugin = self
                .registry
                .get(record.handler)
                .map(|entry| entry.name().to_string())
                .unwrap_or_default();

            if self.config.dry_run {
                log::info!("Would install \"{}/{}\" with \"{}\"", file.mod_name, file.path.display(), plugin);
                self.report.resolutions.push((file.mod_name, file.path, plugin));
                continue;
            }

            match self.registry.install(record.handler, &file) {
                Ok(()) => {
                    log::info!("Installed \"{}/{}\" with \"{}\"", file.mod_name, file.path.display(), plugin);
                    self.report.files_installed += 1;
                }
                Err(e) => {
                    log::error!("{}", e);
                    self.report.install_failures += 1;
                }
            }
        }
    }

    fn post_process(&mut self) {
        log_phase(KernelLifecyclePhase::PostProcess);
        if self.config.dry_run {
            log::info!("Dry run, post-processing skipped");
            return;
        }
        let _cwd = enter_or_warn(self.layout.game_dir());
        self.report.post_process_failures = self.registry.post_process_all();
    }

    fn clear_files_data(&mut self) {
        log_phase(KernelLifecyclePhase::ClearFilesData);
        self.tree.clear();
    }

    pub fn is_working(&self) -> bool {
        self.working
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    pub fn mod_tree(&self) -> &ModTree {
        &self.tree
    }

    pub fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Handle given to plugins, available while working.
    pub fn host(&self) -> Option<&HostContext> {
        self.host.as_ref()
    }

    pub fn last_report(&self) -> &RunReport {
        &self.report
    }
}

impl Drop for ModLoader {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Shutdown on drop failed: {}", e);
        }
    }
}

fn log_phase(phase: KernelLifecyclePhase) {
    log::info!("---- {} ----", phase);
}

fn enter_or_warn(dir: &Path) -> Option<CurrentDirGuard> {
    match CurrentDirGuard::enter(dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            log::warn!("Failed to enter \"{}\": {}", dir.display(), e);
            None
        }
    }
}
