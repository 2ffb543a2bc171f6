//! # Module Loading
//!
//! The registry never opens plugin modules itself. It goes through a
//! [`ModuleLoader`], which turns a path into a [`LoadedModule`] and a module
//! into a plugin instance.
//!
//! Two loaders ship with the core:
//!
//! - [`NativeModuleLoader`] opens shared libraries with `libloading` and looks
//!   for the [`PluginDeclaration`] exported by [`declare_plugin!`].
//! - [`StaticModuleLoader`] serves plugins linked into the executable,
//!   registered by name.
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use libloading::{Library, Symbol};

use crate::kernel::constants;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::isolation;
use crate::plugin_system::traits::Plugin;

/// Opens plugin modules.
pub trait ModuleLoader {
    /// File extension (without the dot) of loadable modules.
    fn module_extension(&self) -> &str;

    /// Modules found directly inside `dir`, in directory enumeration order.
    fn discover(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let wanted = self.module_extension();
        let mut modules = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
            if matches {
                modules.push(path);
            }
        }
        Ok(modules)
    }

    /// Open the module at `path`.
    fn load(&self, path: &Path) -> Result<Box<dyn LoadedModule>, PluginSystemError>;
}

/// An opened module. Dropping it releases the module.
pub trait LoadedModule {
    fn path(&self) -> &Path;

    /// Instantiate the plugin the module exports, `None` when it exports none.
    fn entry_point(&self) -> Option<Box<dyn Plugin>>;
}

/// Entry point exported by native plugin modules.
pub struct PluginDeclaration {
    /// Version of `modloader-core` the module was built against
    pub core_version: &'static str,
    pub create: fn() -> Box<dyn Plugin>,
}

/// Export a plugin type from a `cdylib`.
///
/// ```ignore
/// modloader_core::declare_plugin!(MyPlugin, MyPlugin::new);
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($plugin_type:ty, $constructor:path) => {
        #[unsafe(no_mangle)]
        pub static MODLOADER_PLUGIN: $crate::plugin_system::loader::PluginDeclaration =
            $crate::plugin_system::loader::PluginDeclaration {
                core_version: $crate::kernel::constants::CORE_ABI_VERSION,
                create: {
                    fn create_plugin() -> ::std::boxed::Box<dyn $crate::plugin_system::traits::Plugin> {
                        let constructor: fn() -> $plugin_type = $constructor;
                        ::std::boxed::Box::new(constructor())
                    }
                    create_plugin
                },
            };
    };
}

/// Loads plugins from shared libraries.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeModuleLoader;

impl NativeModuleLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for NativeModuleLoader {
    fn module_extension(&self) -> &str {
        std::env::consts::DLL_EXTENSION
    }

    fn load(&self, path: &Path) -> Result<Box<dyn LoadedModule>, PluginSystemError> {
        let library = unsafe { Library::new(path) }.map_err(|e| PluginSystemError::ModuleLoad {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        let module = NativeModule {
            path: path.to_path_buf(),
            library,
        };

        if let Some(declaration) = module.declaration() {
            if declaration.core_version != constants::CORE_ABI_VERSION {
                return Err(PluginSystemError::ModuleLoad {
                    path: path.to_path_buf(),
                    source: format!(
                        "module was built against modloader-core {}, host uses {}",
                        declaration.core_version,
                        constants::CORE_ABI_VERSION
                    )
                    .into(),
                });
            }
        }

        Ok(Box::new(module))
    }
}

struct NativeModule {
    path: PathBuf,
    library: Library,
}

impl NativeModule {
    fn declaration(&self) -> Option<&PluginDeclaration> {
        let symbol: Symbol<*const PluginDeclaration> =
            unsafe { self.library.get(constants::PLUGIN_DECLARATION_SYMBOL) }.ok()?;
        let declaration = *symbol;
        // The static lives as long as the library, which `self` owns
        unsafe { declaration.as_ref() }
    }
}

impl LoadedModule for NativeModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entry_point(&self) -> Option<Box<dyn Plugin>> {
        let declaration = self.declaration()?;
        let label = self.path.display().to_string();
        match isolation::isolate(&label, "create", declaration.create) {
            Ok(plugin) => Some(plugin),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        }
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule").field("path", &self.path).finish()
    }
}

type PluginFactory = Arc<dyn Fn() -> Option<Box<dyn Plugin>> + Send + Sync>;

/// Serves plugins compiled into the executable.
///
/// Modules are addressed by the name they were registered under; `discover`
/// returns every registered name in registration order, whatever directory
/// it is asked about.
#[derive(Default, Clone)]
pub struct StaticModuleLoader {
    factories: Vec<(String, PluginFactory)>,
    live_modules: Arc<AtomicUsize>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module that exports the plugin built by `factory`.
    pub fn register<F, P>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Plugin + 'static,
    {
        self.factories
            .push((name.into(), Arc::new(move || Some(Box::new(factory()) as Box<dyn Plugin>))));
        self
    }

    /// Register a module that exports no plugin entry point.
    pub fn register_without_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.factories.push((name.into(), Arc::new(|| None)));
        self
    }

    /// Number of modules opened through this loader and not yet released.
    pub fn live_modules(&self) -> usize {
        self.live_modules.load(Ordering::SeqCst)
    }

    fn factory(&self, path: &Path) -> Option<&PluginFactory> {
        self.factories
            .iter()
            .find(|(name, _)| Path::new(name) == path)
            .map(|(_, factory)| factory)
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn module_extension(&self) -> &str {
        ""
    }

    fn discover(&self, _dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self.factories.iter().map(|(name, _)| PathBuf::from(name)).collect())
    }

    fn load(&self, path: &Path) -> Result<Box<dyn LoadedModule>, PluginSystemError> {
        let factory = self.factory(path).ok_or_else(|| PluginSystemError::ModuleLoad {
            path: path.to_path_buf(),
            source: Box::new(io::Error::new(io::ErrorKind::NotFound, "no statically linked module with this name")),
        })?;

        self.live_modules.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticModule {
            path: path.to_path_buf(),
            factory: Arc::clone(factory),
            live_modules: Arc::clone(&self.live_modules),
        }))
    }
}

struct StaticModule {
    path: PathBuf,
    factory: PluginFactory,
    live_modules: Arc<AtomicUsize>,
}

impl LoadedModule for StaticModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entry_point(&self) -> Option<Box<dyn Plugin>> {
        (self.factory)()
    }
}

impl Drop for StaticModule {
    fn drop(&mut self) {
        self.live_modules.fetch_sub(1, Ordering::SeqCst);
    }
}
