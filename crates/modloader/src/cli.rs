use std::path::PathBuf;

use clap::{Parser, Subcommand};

use modloader_core::kernel::constants;

/// Modloader: installs mods through handler plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Game directory containing the mod root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub game_dir: Option<PathBuf>,

    /// Name of the mod root directory inside the game directory
    #[arg(long, value_name = "NAME", default_value = constants::DEFAULT_ROOT_DIR_NAME)]
    pub root: String,

    /// Configuration file to use instead of the one in the data directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log to stdout instead of the log file
    #[arg(long)]
    pub stdout_log: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Load plugins, resolve and install every mod file, then shut down
    Run,
    /// Resolve every mod file and print its handler without installing anything
    Scan,
    /// List the plugins found in the plugins directory
    Plugins,
}
