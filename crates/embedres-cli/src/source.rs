//! Where the CLI reads resources from.

use bytes::Bytes;
use embedres::platform::has_automatic_hooks;
use embedres::{Registration, Resource, ResourceInfo, ResourceRegistry, Result};
use std::path::Path;
use tracing::{debug, info};

/// Either the process-wide registry or a single bundle file.
pub enum BundleSource {
    Global {
        registry: &'static ResourceRegistry,
        /// Held only on targets where the linked bundle cannot register itself.
        _registration: Option<Registration>,
    },
    File(Resource),
}

impl BundleSource {
    /// Open `file`, or fall back to the bundles linked into this binary.
    pub fn open(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            info!("Reading bundle {}", path.display());
            return Ok(BundleSource::File(Resource::load(path)?));
        }

        let record = dock_resources::dock_static_resource();
        let registration = if has_automatic_hooks() {
            None
        } else {
            debug!("No load hooks on this target, registering dock bundle explicitly");
            Some(record.register()?)
        };
        debug!("Using global registry ({} bundles)", ResourceRegistry::global().len());

        Ok(BundleSource::Global {
            registry: ResourceRegistry::global(),
            _registration: registration,
        })
    }

    pub fn leaf_paths(&self) -> Result<Vec<String>> {
        match self {
            BundleSource::Global { registry, .. } => registry.leaf_paths(),
            BundleSource::File(resource) => Ok(resource.leaf_paths()),
        }
    }

    pub fn lookup_data(&self, path: &str) -> Result<Bytes> {
        match self {
            BundleSource::Global { registry, .. } => registry.lookup_data(path),
            BundleSource::File(resource) => resource.lookup_data(path),
        }
    }

    pub fn get_info(&self, path: &str) -> Result<ResourceInfo> {
        match self {
            BundleSource::Global { registry, .. } => registry.get_info(path),
            BundleSource::File(resource) => resource.get_info(path),
        }
    }

    pub fn enumerate_children(&self, path: &str) -> Result<Vec<String>> {
        match self {
            BundleSource::Global { registry, .. } => registry.enumerate_children(path),
            BundleSource::File(resource) => resource.enumerate_children(path),
        }
    }
}
