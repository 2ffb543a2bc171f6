//! Fatal fault interception.
//!
//! The host calls into the loader through [`guard`]. A panic escaping the
//! guarded call shuts the loader down once and then keeps unwinding.
use std::panic::{self, AssertUnwindSafe};

use crate::kernel::bootstrap::ModLoader;
use crate::plugin_system::isolation::panic_message;

/// Run `f` with the loader; on a panic, shut the loader down and resume the unwind.
pub fn guard<R>(loader: &mut ModLoader, f: impl FnOnce(&mut ModLoader) -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(|| f(&mut *loader))) {
        Ok(value) => value,
        Err(payload) => {
            log::error!("Fatal fault: {}. Shutting down.", panic_message(payload.as_ref()));
            if let Err(e) = loader.shutdown() {
                log::error!("Shutdown after fault failed: {}", e);
            }
            panic::resume_unwind(payload)
        }
    }
}
