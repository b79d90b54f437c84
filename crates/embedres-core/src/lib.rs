//! Embedres - Embedded resource bundles with load-time registration.
//!
//! A resource bundle is a packed, hash-indexed archive of named files. This
//! crate embeds one in a module's read-only data, registers it with a
//! process-wide registry when the module is loaded, and unregisters it again
//! before the module is unloaded. Lookups go through the registry by path.
//!
//! # Example
//!
//! ```rust,ignore
//! embedres::embed_resource_bundle! {
//!     pub static APP_RESOURCE_DATA: [u8; APP_RESOURCE_LEN] =
//!         include_bytes!("../resources/app.gresource");
//!     pub static APP_STATIC_RESOURCE;
//!     section = ".gresource.app";
//! }
//!
//! fn main() -> embedres::Result<()> {
//!     let registry = embedres::ResourceRegistry::global();
//!     let css = registry.lookup_data("/io/example/app/style.css")?;
//!     println!("{} bytes", css.len());
//!     Ok(())
//! }
//! ```
//!
//! On targets without a load hook mechanism the macro still builds, with a
//! warning, and the bundle must be registered through
//! [`StaticResource::register`].

pub mod config;
pub mod container;
pub mod error;
pub mod gvdb;
pub mod lifecycle;
pub mod platform;
pub mod registry;
pub mod resource;

// Re-export commonly used types
pub use config::{FormatConfig, ResourceConfig};
pub use container::ResourceContainer;
pub use error::{EmbedError, Result};
pub use gvdb::ResourceFlags;
pub use lifecycle::{LifecycleState, Registration, StaticResource};
pub use platform::{HookStrategy, ACTIVE_STRATEGY};
pub use registry::ResourceRegistry;
pub use resource::{Resource, ResourceInfo};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_compile() {
        let registry = ResourceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(ResourceConfig::ALIGNMENT, 8);
        assert!(!ACTIVE_STRATEGY.as_str().is_empty());
    }
}
