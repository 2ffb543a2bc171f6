mod cli; // Declare the cli module

use std::env;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use modloader_core::kernel::fault;
use modloader_core::plugin_system::{NativeModuleLoader, PluginRegistry};
use modloader_core::{DirectoryLayout, LoaderConfig, ModLoader, PluginVersion, RunReport};

use crate::cli::{CliArgs, Commands};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let game_dir = match args.game_dir.clone() {
        Some(dir) => dir,
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("modloader: cannot determine the current directory: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let layout = match DirectoryLayout::new(&game_dir, &args.root) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("modloader: invalid game directory \"{}\": {}", game_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut config = match load_config(&args, &layout) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("modloader: {}", message);
            return ExitCode::FAILURE;
        }
    };
    if args.log_level.is_some() {
        config.log_level = args.log_level.clone();
    }
    if args.stdout_log {
        config.log_to_stdout = true;
    }

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => run(layout, config),
        Commands::Scan => {
            config.dry_run = true;
            run(layout, config)
        }
        Commands::Plugins => list_plugins(&layout, &config),
    }
}

/// The config given on the command line, else the one in the data directory, else defaults.
fn load_config(args: &CliArgs, layout: &DirectoryLayout) -> Result<LoaderConfig, String> {
    if let Some(path) = &args.config {
        return LoaderConfig::load(path).map_err(|e| e.to_string());
    }
    match LoaderConfig::discover(layout.data_dir()) {
        Ok(Some((config, _origin))) => Ok(config),
        Ok(None) => Ok(LoaderConfig::default()),
        Err(e) => Err(e.to_string()),
    }
}

fn run(layout: DirectoryLayout, config: LoaderConfig) -> ExitCode {
    let dry_run = config.dry_run;
    let mut loader = ModLoader::new(layout, config, Box::new(NativeModuleLoader::new()));

    let started = fault::guard(&mut loader, |loader| loader.startup());
    if let Err(e) = started {
        error!("Startup failed: {}", e);
        eprintln!("modloader: {}", e);
        return ExitCode::FAILURE;
    }

    let report = loader.last_report().clone();
    if dry_run {
        print_resolutions(&report);
    } else {
        print_summary(&report);
    }

    if let Err(e) = loader.shutdown() {
        eprintln!("modloader: shutdown failed: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Done");
    ExitCode::SUCCESS
}

fn print_summary(report: &RunReport) {
    println!("Plugins loaded: {}", report.plugins_loaded);
    println!("Mods: {}", report.mods);
    println!("Files resolved: {}", report.files_resolved);
    println!("Files installed: {}", report.files_installed);
    if report.install_failures > 0 {
        println!("Install failures: {}", report.install_failures);
    }
    if report.post_process_failures > 0 {
        println!("Post-process failures: {}", report.post_process_failures);
    }
}

fn print_resolutions(report: &RunReport) {
    if report.resolutions.is_empty() {
        println!("No files resolved ({} mods, {} plugins)", report.mods, report.plugins_loaded);
        return;
    }
    for (mod_name, path, plugin) in &report.resolutions {
        println!("{}/{} -> {}", mod_name, path.display(), plugin);
    }
}

fn list_plugins(layout: &DirectoryLayout, config: &LoaderConfig) -> ExitCode {
    if let Err(e) = layout.validate() {
        eprintln!("modloader: {}", e);
        return ExitCode::FAILURE;
    }

    let mut registry =
        PluginRegistry::new(PluginVersion::host()).with_priority_overrides(config.plugin_priorities.clone());
    if layout.plugins_dir().is_dir() {
        registry.load_directory(&NativeModuleLoader::new(), layout.plugins_dir());
    }

    if registry.is_empty() {
        println!("No plugins found in \"{}\"", layout.plugins_dir().display());
    } else {
        println!("Plugins in \"{}\":", layout.plugins_dir().display());
        for entry in registry.iter() {
            let info = entry.info();
            let extensions = entry.handled_extensions();
            println!(
                "  {} {} by {} (priority {}){}",
                info.name,
                info.version,
                info.author,
                info.priority,
                if extensions.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", extensions.join(", "))
                }
            );
        }
    }

    registry.unload_all();
    ExitCode::SUCCESS
}
