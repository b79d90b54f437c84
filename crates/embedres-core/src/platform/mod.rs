//! Platform abstraction layer for load/unload hooks.
//!
//! This module centralizes all platform-specific code. All `#[cfg]` blocks
//! for object-format or loader behavior should live here rather than be
//! scattered through the crate.
//!
//! # Architecture
//!
//! - `hooks` - Hook strategies and the macros that place hook pointers
//! - `atexit` - Process/module exit callbacks for formats without a
//!   destructor section
//!
//! # Supported Platforms
//!
//! - **ELF** (Linux, BSDs, Android, illumos): `.init_array` / `.fini_array`
//! - **Mach-O** (macOS, iOS): `__mod_init_func` plus `atexit`
//! - **PE** (Windows): `.CRT$XCU` plus `atexit`
//! - Anything else builds with a warning and needs explicit registration

mod atexit;
pub mod hooks;

pub use hooks::{
    hook_diagnostics, set_hook_diagnostics, ActiveHooks, AtExitHooks, ExplicitHooks,
    HookStrategy, LifecycleHooks, SectionArrayHooks, ACTIVE_STRATEGY,
};

/// Object file format of the current target.
pub fn object_format() -> &'static str {
    match ACTIVE_STRATEGY {
        HookStrategy::InitArray => "elf",
        HookStrategy::ModInitFunc => "mach-o",
        HookStrategy::CrtXcu => "pe",
        HookStrategy::Unsupported => "unknown",
    }
}

/// Returns true if embedded bundles register themselves on this target.
pub fn has_automatic_hooks() -> bool {
    ACTIVE_STRATEGY != HookStrategy::Unsupported
}
