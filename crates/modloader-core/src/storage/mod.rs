//! # Modloader Storage
//!
//! On-disk surroundings of a loader run: the directory layout below the game
//! directory and the loader configuration read from the data directory.
pub mod config;
pub mod error;
pub mod layout;

pub use config::{ConfigFormat, LoaderConfig};
pub use error::StorageSystemError;
pub use layout::DirectoryLayout;

#[cfg(test)]
mod tests;
