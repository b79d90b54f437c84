//! Load/unload hook strategies.
//!
//! There is no portable way to ask for "run this when the module is loaded
//! and again before it is unloaded". Each object format has its own
//! mechanism, so the choice is made once at build time (`build.rs` sets
//! `embedres_hooks`) from a closed set:
//!
//! | Strategy      | Load                      | Unload                  |
//! |---------------|---------------------------|-------------------------|
//! | `InitArray`   | `.init_array` entry       | `.fini_array` entry     |
//! | `ModInitFunc` | `__DATA,__mod_init_func`  | `atexit` from load hook |
//! | `CrtXcu`      | `.CRT$XCU` entry          | `atexit` from load hook |
//! | `Unsupported` | explicit `register()`     | dropping the guard      |
//!
//! The host loader runs every load hook after the module's statics are
//! mapped and before outside code can call into it, and every unload hook
//! before the statics are unmapped. Nothing here adds synchronization on top
//! of that guarantee.

use crate::error::Result;
use crate::lifecycle::StaticResource;
use std::sync::atomic::{AtomicBool, Ordering};

use super::atexit::register_at_exit;

/// How a target runs code at module load and unload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStrategy {
    /// ELF: function pointers in `.init_array` / `.fini_array`.
    InitArray,
    /// Mach-O: function pointer in `__mod_init_func`, unload via `atexit`.
    ModInitFunc,
    /// PE: function pointer in `.CRT$XCU`, unload via `atexit`.
    CrtXcu,
    /// No known mechanism; the embedding code must register explicitly.
    Unsupported,
}

impl HookStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookStrategy::InitArray => "init_array",
            HookStrategy::ModInitFunc => "mod_init_func",
            HookStrategy::CrtXcu => "crt_xcu",
            HookStrategy::Unsupported => "unsupported",
        }
    }

    /// Linker section the load hook pointer is placed in.
    pub fn load_section(&self) -> Option<&'static str> {
        match self {
            HookStrategy::InitArray => Some(".init_array"),
            HookStrategy::ModInitFunc => Some("__DATA,__mod_init_func"),
            HookStrategy::CrtXcu => Some(".CRT$XCU"),
            HookStrategy::Unsupported => None,
        }
    }

    /// Linker section for the unload hook, if the format has one.
    pub fn unload_section(&self) -> Option<&'static str> {
        match self {
            HookStrategy::InitArray => Some(".fini_array"),
            _ => None,
        }
    }
}

impl std::fmt::Display for HookStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a strategy does when its hooks fire.
///
/// `install` runs from the load hook and `remove` from the unload hook,
/// each exactly once per module load. `remove` must not log: it can run
/// after the process has torn down thread-local storage.
pub trait LifecycleHooks {
    fn install(record: &'static StaticResource, unload: extern "C" fn()) -> Result<()>;
    fn remove(record: &'static StaticResource) -> Result<()>;
}

/// Both hooks come from linker sections; nothing to schedule at load time.
pub struct SectionArrayHooks;

impl LifecycleHooks for SectionArrayHooks {
    fn install(record: &'static StaticResource, _unload: extern "C" fn()) -> Result<()> {
        record.init()
    }

    fn remove(record: &'static StaticResource) -> Result<()> {
        record.teardown()
    }
}

/// Load hook from a linker section; the unload hook is handed to `atexit`.
pub struct AtExitHooks;

impl LifecycleHooks for AtExitHooks {
    fn install(record: &'static StaticResource, unload: extern "C" fn()) -> Result<()> {
        record.init()?;
        if let Err(err) = register_at_exit(unload) {
            record.fini()?;
            return Err(err);
        }
        Ok(())
    }

    fn remove(record: &'static StaticResource) -> Result<()> {
        record.teardown()
    }
}

/// No automatic hooks; used through [`StaticResource::register`].
pub struct ExplicitHooks;

impl LifecycleHooks for ExplicitHooks {
    fn install(record: &'static StaticResource, _unload: extern "C" fn()) -> Result<()> {
        record.init()
    }

    fn remove(record: &'static StaticResource) -> Result<()> {
        record.teardown()
    }
}

#[cfg(embedres_hooks = "init_array")]
pub type ActiveHooks = SectionArrayHooks;
#[cfg(embedres_hooks = "init_array")]
pub const ACTIVE_STRATEGY: HookStrategy = HookStrategy::InitArray;

#[cfg(embedres_hooks = "mod_init_func")]
pub type ActiveHooks = AtExitHooks;
#[cfg(embedres_hooks = "mod_init_func")]
pub const ACTIVE_STRATEGY: HookStrategy = HookStrategy::ModInitFunc;

#[cfg(embedres_hooks = "crt_xcu")]
pub type ActiveHooks = AtExitHooks;
#[cfg(embedres_hooks = "crt_xcu")]
pub const ACTIVE_STRATEGY: HookStrategy = HookStrategy::CrtXcu;

#[cfg(not(any(
    embedres_hooks = "init_array",
    embedres_hooks = "mod_init_func",
    embedres_hooks = "crt_xcu"
)))]
pub type ActiveHooks = ExplicitHooks;
#[cfg(not(any(
    embedres_hooks = "init_array",
    embedres_hooks = "mod_init_func",
    embedres_hooks = "crt_xcu"
)))]
pub const ACTIVE_STRATEGY: HookStrategy = HookStrategy::Unsupported;

/// Body of a generated load hook.
///
/// A bundle that cannot register leaves a broken module behind, and no
/// logging subscriber exists yet this early, so failure is reported on
/// stderr and the process aborts.
#[doc(hidden)]
pub fn run_load_hook(record: &'static StaticResource, unload: extern "C" fn()) {
    if let Err(err) = ActiveHooks::install(record, unload) {
        eprintln!("embedres: failed to register embedded resource bundle: {err}");
        std::process::abort();
    }
}

static HOOK_DIAGNOSTICS: AtomicBool = AtomicBool::new(false);

/// Report successful unload hooks on stderr.
///
/// Unload hooks cannot go through `tracing`, so hosts that want to see
/// teardown opt in here.
pub fn set_hook_diagnostics(enabled: bool) {
    HOOK_DIAGNOSTICS.store(enabled, Ordering::Release);
}

pub fn hook_diagnostics() -> bool {
    HOOK_DIAGNOSTICS.load(Ordering::Acquire)
}

/// Body of a generated unload hook. Reports on stderr only.
#[doc(hidden)]
pub fn run_unload_hook(record: &'static StaticResource) {
    match ActiveHooks::remove(record) {
        Ok(()) if hook_diagnostics() => eprintln!(
            "embedres: Unregistered embedded resource bundle ({} bytes)",
            record.len()
        ),
        Ok(()) => {}
        Err(err) => eprintln!("embedres: failed to unregister embedded resource bundle: {err}"),
    }
}

/// Emits the load/unload hooks for one record. Selected per target.
#[cfg(embedres_hooks = "init_array")]
#[doc(hidden)]
#[macro_export]
macro_rules! __embedres_hooks {
    ($record:path) => {
        const _: () = {
            extern "C" fn load() {
                $crate::platform::hooks::run_load_hook(&$record, unload);
            }

            extern "C" fn unload() {
                $crate::platform::hooks::run_unload_hook(&$record);
            }

            // SAFETY: `.init_array`/`.fini_array` hold bare `extern "C" fn()`
            // pointers; both entries have that type and no other code reads
            // the sections.
            #[used]
            #[allow(unsafe_code)]
            #[link_section = ".init_array"]
            static LOAD: extern "C" fn() = load;

            // SAFETY: as for `LOAD`.
            #[used]
            #[allow(unsafe_code)]
            #[link_section = ".fini_array"]
            static UNLOAD: extern "C" fn() = unload;
        };
    };
}

#[cfg(embedres_hooks = "mod_init_func")]
#[doc(hidden)]
#[macro_export]
macro_rules! __embedres_hooks {
    ($record:path) => {
        const _: () = {
            extern "C" fn load() {
                $crate::platform::hooks::run_load_hook(&$record, unload);
            }

            extern "C" fn unload() {
                $crate::platform::hooks::run_unload_hook(&$record);
            }

            // SAFETY: `__mod_init_func` holds bare `extern "C" fn()` pointers
            // run by dyld; `LOAD` has exactly that type.
            #[used]
            #[allow(unsafe_code)]
            #[link_section = "__DATA,__mod_init_func"]
            static LOAD: extern "C" fn() = load;
        };
    };
}

#[cfg(embedres_hooks = "crt_xcu")]
#[doc(hidden)]
#[macro_export]
macro_rules! __embedres_hooks {
    ($record:path) => {
        const _: () = {
            extern "C" fn load() {
                // Reference our own slot so whole-program optimization keeps it.
                let _ = ::core::hint::black_box(&LOAD);
                $crate::platform::hooks::run_load_hook(&$record, unload);
            }

            extern "C" fn unload() {
                $crate::platform::hooks::run_unload_hook(&$record);
            }

            // SAFETY: `.CRT$XCU` holds bare `extern "C" fn()` pointers run by
            // the CRT initializer table; `LOAD` has exactly that type.
            #[used]
            #[allow(unsafe_code)]
            #[link_section = ".CRT$XCU"]
            static LOAD: extern "C" fn() = load;
        };
    };
}

#[cfg(not(any(
    embedres_hooks = "init_array",
    embedres_hooks = "mod_init_func",
    embedres_hooks = "crt_xcu"
)))]
#[doc(hidden)]
#[macro_export]
macro_rules! __embedres_hooks {
    ($record:path) => {
        const _: () = {
            #[deprecated(
                note = "embedres has no load/unload hook mechanism for this target; \
                        call StaticResource::register() from the code that owns the module lifetime"
            )]
            const NO_LOAD_HOOK: () = ();
            NO_LOAD_HOOK
        };
    };
}
