//! Exit callbacks for formats that only have a constructor section.
//!
//! Mach-O and PE modules get their unload hook by registering it with the
//! C runtime from inside the load hook. The runtime runs it when the module
//! is unloaded (or at process exit for the main executable).

use crate::error::{EmbedError, Result};

/// Schedule `callback` to run when the current module is torn down.
#[cfg(any(unix, windows))]
#[allow(unsafe_code)]
pub(crate) fn register_at_exit(callback: extern "C" fn()) -> Result<()> {
    // SAFETY: `callback` is a plain function pointer with no captured state,
    // and atexit only stores it for the runtime to call later.
    let rc = unsafe { libc::atexit(callback) };
    if rc != 0 {
        return Err(EmbedError::HookFailed {
            message: format!("atexit returned {rc}"),
        });
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn register_at_exit(_callback: extern "C" fn()) -> Result<()> {
    Err(EmbedError::HookFailed {
        message: "atexit is not available on this target".to_string(),
    })
}
