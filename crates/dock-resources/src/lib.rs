//! The dock's packed stylesheet bundle.
//!
//! Linking this crate is enough to make its resources available: the bundle
//! is registered with [`ResourceRegistry::global`] when the module loads and
//! unregistered before it unloads.
//!
//! | Path                                  | Stored                   |
//! |---------------------------------------|--------------------------|
//! | `/io/elementary/dock/Application.css` | zlib, 46 bytes inflated  |

use embedres::{Resource, ResourceRegistry, Result, StaticResource};
use std::sync::Arc;
use tracing::debug;

/// Resource path of the dock stylesheet.
pub const DOCK_STYLESHEET_PATH: &str = "/io/elementary/dock/Application.css";

embedres::embed_resource_bundle! {
    /// The packed bundle, 8-byte aligned.
    pub static DOCK_RESOURCE_DATA: [u8; DOCK_RESOURCE_LEN] =
        include_bytes!("../resources/dock.gresource");
    static DOCK_STATIC_RESOURCE;
    section = ".gresource.dock";
}

/// Registration record of the bundle.
pub fn dock_static_resource() -> &'static StaticResource {
    &DOCK_STATIC_RESOURCE
}

/// The parsed bundle, as registered.
pub fn dock_resource() -> Result<Arc<Resource>> {
    DOCK_STATIC_RESOURCE.resource()
}

/// The dock stylesheet text, resolved through the global registry.
pub fn dock_stylesheet() -> Result<String> {
    let data = ResourceRegistry::global().lookup_data(DOCK_STYLESHEET_PATH)?;
    debug!("Resolved dock stylesheet ({} bytes)", data.len());
    Ok(String::from_utf8_lossy(&data).into_owned())
}
