//! Reference handler plugin.
//!
//! Claims plain text and config files and installs them by copying them to
//! `<cache>/copy-installer/<mod>/<path>`. After each run it writes
//! `installed.txt` next to the copies, listing what was copied.
use std::fs;
use std::path::PathBuf;

use modloader_core::plugin_system::{CheckResult, Plugin, PluginError, PluginInfo, PluginVersion};
use modloader_core::{FileDescriptor, HostContext};

const PLUGIN_NAME: &str = "copy-installer";
const HANDLED_EXTENSIONS: &[&str] = &["txt", "cfg", "ini"];

#[derive(Debug, Default)]
pub struct CopyInstaller {
    target: Option<PathBuf>,
    installed: Vec<PathBuf>,
}

impl CopyInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    fn target(&self) -> Result<&PathBuf, PluginError> {
        self.target
            .as_ref()
            .ok_or_else(|| PluginError::Failed("plugin was not started".to_string()))
    }
}

impl Plugin for CopyInstaller {
    fn info(&self) -> PluginInfo {
        PluginInfo::new(PLUGIN_NAME)
            .version(PluginVersion::new(0, 2, 0))
            .author("Modloader Developers")
            .priority(40)
    }

    fn handled_extensions(&self) -> Vec<String> {
        HANDLED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn check_file(&self, file: &FileDescriptor) -> CheckResult {
        if !file.is_dir && HANDLED_EXTENSIONS.contains(&file.extension.as_str()) {
            CheckResult::Yes
        } else {
            CheckResult::No
        }
    }

    fn install_file(&mut self, file: &FileDescriptor) -> Result<(), PluginError> {
        let destination = self.target()?.join(&file.mod_name).join(&file.path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&file.full_path, &destination)?;

        log::debug!("Copied \"{}\" to \"{}\"", file.full_path.display(), destination.display());
        self.installed.push(destination);
        Ok(())
    }

    fn startup(&mut self, host: &HostContext) -> Result<(), PluginError> {
        let target = host.cache_dir().join(PLUGIN_NAME);
        fs::create_dir_all(&target)?;
        host.log(format_args!("{} installs into \"{}\"", PLUGIN_NAME, target.display()));
        self.target = Some(target);
        Ok(())
    }

    fn post_process(&mut self) -> Result<(), PluginError> {
        let listing = self.target()?.join("installed.txt");
        let mut content = String::new();
        for path in self.installed.drain(..) {
            content.push_str(&path.display().to_string());
            content.push('\n');
        }
        fs::write(&listing, content)?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), PluginError> {
        self.target = None;
        self.installed.clear();
        Ok(())
    }
}

modloader_core::declare_plugin!(CopyInstaller, CopyInstaller::new);
