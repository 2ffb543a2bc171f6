
/// Mock plugins shared by the test suites of the whole crate.
pub(crate) mod mocks {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex as StdMutex};

    use crate::kernel::host::HostContext;
    use crate::mod_tree::{FileDescriptor, FileId, ModId};
    use crate::plugin_system::loader::StaticModuleLoader;
    use crate::plugin_system::traits::{CheckResult, Plugin, PluginError, PluginInfo};
    use crate::plugin_system::version::PluginVersion;

    pub type Tracker = Arc<StdMutex<Vec<String>>>;

    pub fn tracker() -> Tracker {
        Arc::new(StdMutex::new(Vec::new()))
    }

    pub fn events(tracker: &Tracker) -> Vec<String> {
        tracker.lock().unwrap().clone()
    }

    /// Which files a mock claims.
    #[derive(Clone, Debug)]
    pub enum Accept {
        /// Files whose extension is in the declared list
        Declared,
        /// Everything
        Any,
        Nothing,
        /// Only directories with this name
        DirNamed(String),
        /// Panic inside the interest test
        Panic,
    }

    #[derive(Clone)]
    pub struct MockPlugin {
        pub name: String,
        pub priority: i32,
        pub version: PluginVersion,
        pub extensions: Vec<String>,
        pub accept: Accept,
        pub fail_install: bool,
        pub fail_startup: bool,
        pub panic_on_shutdown: bool,
        pub tracker: Tracker,
    }

    impl MockPlugin {
        pub fn new(name: &str, priority: i32, tracker: &Tracker) -> Self {
            Self {
                name: name.to_string(),
                priority,
                version: PluginVersion::new(0, 1, 0),
                extensions: Vec::new(),
                accept: Accept::Declared,
                fail_install: false,
                fail_startup: false,
                panic_on_shutdown: false,
                tracker: Arc::clone(tracker),
            }
        }

        pub fn extensions(mut self, extensions: &[&str]) -> Self {
            self.extensions = extensions.iter().map(|e| e.to_string()).collect();
            self
        }

        pub fn accept(mut self, accept: Accept) -> Self {
            self.accept = accept;
            self
        }

        pub fn version(mut self, version: PluginVersion) -> Self {
            self.version = version;
            self
        }

        fn record(&self, event: String) {
            self.tracker.lock().unwrap().push(event);
        }
    }

    impl Plugin for MockPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo::new(self.name.clone())
                .version(self.version)
                .author("tests")
                .priority(self.priority)
        }

        fn handled_extensions(&self) -> Vec<String> {
            self.extensions.clone()
        }

        fn check_file(&self, file: &FileDescriptor) -> CheckResult {
            self.record(format!("{}:check:{}", self.name, file.path.display()));
            let accepted = match &self.accept {
                Accept::Declared => {
                    !file.is_dir
                        && self
                            .extensions
                            .iter()
                            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&file.extension))
                }
                Accept::Any => true,
                Accept::Nothing => false,
                Accept::DirNamed(name) => file.is_dir && &file.name == name,
                Accept::Panic => panic!("check_file exploded"),
            };
            if accepted { CheckResult::Yes } else { CheckResult::No }
        }

        fn install_file(&mut self, file: &FileDescriptor) -> Result<(), PluginError> {
            self.record(format!("{}:install:{}", self.name, file.path.display()));
            if self.fail_install {
                return Err(PluginError::Declined("not today".to_string()));
            }
            Ok(())
        }

        fn startup(&mut self, _host: &HostContext) -> Result<(), PluginError> {
            self.record(format!("{}:startup", self.name));
            if self.fail_startup {
                return Err(PluginError::Failed("startup failed".to_string()));
            }
            Ok(())
        }

        fn post_process(&mut self) -> Result<(), PluginError> {
            self.record(format!("{}:post_process", self.name));
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), PluginError> {
            self.record(format!("{}:shutdown", self.name));
            if self.panic_on_shutdown {
                panic!("shutdown exploded");
            }
            Ok(())
        }
    }

    /// A static loader serving each mock under its own name.
    pub fn loader_with(plugins: Vec<MockPlugin>) -> StaticModuleLoader {
        let mut loader = StaticModuleLoader::new();
        for plugin in plugins {
            let name = plugin.name.clone();
            loader.register(name, move || plugin.clone());
        }
        loader
    }

    /// Descriptor of an entry inside a mod called `mod1`.
    pub fn descriptor(path: &str, is_dir: bool) -> FileDescriptor {
        let path = PathBuf::from(path);
        let mod_path = PathBuf::from("/game/modloader/mod1");
        FileDescriptor {
            file_id: FileId(0),
            mod_id: ModId(0),
            mod_name: "mod1".to_string(),
            full_path: mod_path.join(&path),
            mod_path,
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            extension: crate::utils::fs::extension_of(&path),
            path,
            is_dir,
            recursion: is_dir,
        }
    }

    pub fn module(name: &str) -> &Path {
        Path::new(name)
    }
}
