//! Runs plugin callbacks so that a panicking plugin is reported as an error
//! instead of taking the whole run down.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::plugin_system::error::PluginSystemError;

/// Run `f` on behalf of `plugin`, turning an unwind into [`PluginSystemError::Panicked`].
pub fn isolate<R>(plugin: &str, operation: &str, f: impl FnOnce() -> R) -> Result<R, PluginSystemError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| PluginSystemError::Panicked {
        plugin: plugin.to_string(),
        operation: operation.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
