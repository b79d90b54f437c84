//! Lock-protected list of registered bundles and pending static records.

use crate::error::{EmbedError, Result};
use crate::lifecycle::StaticResource;
use crate::resource::{Resource, ResourceInfo};
use bytes::Bytes;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error};

#[derive(Default)]
struct RegistryState {
    /// Most recently registered first.
    resources: Vec<Arc<Resource>>,
    /// Records registered by load hooks but not parsed yet.
    pending: Vec<&'static StaticResource>,
}

/// Registry answering path lookups across every registered bundle.
///
/// Uses an `RwLock` so concurrent readers never block each other; the only
/// writers are registration, teardown and the one-off parse of queued records.
pub struct ResourceRegistry {
    state: RwLock<RegistryState>,
}

static GLOBAL: ResourceRegistry = ResourceRegistry::new();

impl ResourceRegistry {
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                resources: Vec::new(),
                pending: Vec::new(),
            }),
        }
    }

    /// The registry load hooks register into.
    ///
    /// Constant-initialised, so it is usable before `main` runs.
    pub fn global() -> &'static ResourceRegistry {
        &GLOBAL
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>> {
        self.state.read().map_err(|_| EmbedError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryState>> {
        self.state.write().map_err(|_| EmbedError::Poisoned)
    }

    // ========================================
    // Registration
    // ========================================

    /// Register an already parsed bundle.
    pub fn register(&self, resource: Arc<Resource>) -> Result<()> {
        let mut state = self.write()?;
        if state.resources.iter().any(|r| Arc::ptr_eq(r, &resource)) {
            return Err(EmbedError::AlreadyRegistered);
        }
        state.resources.insert(0, resource);
        debug!("Registered resource bundle ({} total)", state.resources.len());
        Ok(())
    }

    pub fn unregister(&self, resource: &Arc<Resource>) -> Result<()> {
        let mut state = self.write()?;
        let index = state
            .resources
            .iter()
            .position(|r| Arc::ptr_eq(r, resource))
            .ok_or(EmbedError::NotRegistered)?;
        state.resources.remove(index);
        debug!("Unregistered resource bundle ({} remaining)", state.resources.len());
        Ok(())
    }

    pub fn is_registered(&self, resource: &Arc<Resource>) -> bool {
        self.read()
            .map(|state| state.resources.iter().any(|r| Arc::ptr_eq(r, resource)))
            .unwrap_or(false)
    }

    /// Number of bundles, counting queued records that are not parsed yet.
    pub fn len(&self) -> usize {
        self.read()
            .map(|state| state.resources.len() + state.pending.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn queue_static(&self, record: &'static StaticResource) -> Result<()> {
        let mut state = self.write()?;
        state.pending.insert(0, record);
        Ok(())
    }

    /// Drop every trace of a static record in one write: its queue entry
    /// and, if it was realised, its parsed bundle. Does not log.
    pub(crate) fn release_static(
        &self,
        record: &'static StaticResource,
        resource: Option<&Arc<Resource>>,
    ) -> Result<()> {
        let mut state = self.write()?;
        state.pending.retain(|queued| !std::ptr::eq(*queued, record));
        if let Some(resource) = resource {
            state.resources.retain(|r| !Arc::ptr_eq(r, resource));
        }
        Ok(())
    }

    /// Parse every queued record and move it to the resource list.
    ///
    /// A record whose bytes do not parse is a broken build; it is logged and
    /// left out rather than failing every lookup in the process.
    fn realize_pending(&self) -> Result<()> {
        if self.read()?.pending.is_empty() {
            return Ok(());
        }

        let mut state = self.write()?;
        let pending = std::mem::take(&mut state.pending);
        for record in pending.into_iter().rev() {
            match record.realize() {
                Ok(resource) => state.resources.insert(0, resource),
                // Torn down while queued.
                Err(EmbedError::NotRegistered) => continue,
                Err(err) => error!(
                    "Dropping embedded resource bundle ({} bytes): {}",
                    record.len(),
                    err
                ),
            }
        }
        Ok(())
    }

    /// Registered bundles in lookup order. Queries run on this snapshot so
    /// decompression never happens under the lock.
    fn snapshot(&self) -> Result<Vec<Arc<Resource>>> {
        self.realize_pending()?;
        Ok(self.read()?.resources.clone())
    }

    // ========================================
    // Queries
    // ========================================

    /// Contents of `path` from the first bundle that has it.
    pub fn lookup_data(&self, path: &str) -> Result<Bytes> {
        self.first_hit(path, |resource| resource.lookup_data(path))
    }

    pub fn get_info(&self, path: &str) -> Result<ResourceInfo> {
        self.first_hit(path, |resource| resource.get_info(path))
    }

    /// Union of the children of `path` across all bundles, sorted.
    pub fn enumerate_children(&self, path: &str) -> Result<Vec<String>> {
        let mut found = false;
        let mut children = BTreeSet::new();

        for resource in self.snapshot()? {
            match resource.enumerate_children(path) {
                Ok(names) => {
                    found = true;
                    children.extend(names);
                }
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }

        if !found {
            return Err(EmbedError::not_found(path));
        }
        Ok(children.into_iter().collect())
    }

    pub fn has_children(&self, path: &str) -> bool {
        self.enumerate_children(path)
            .map(|children| !children.is_empty())
            .unwrap_or(false)
    }

    /// Every resource path across all bundles, sorted and deduplicated.
    pub fn leaf_paths(&self) -> Result<Vec<String>> {
        let paths: BTreeSet<String> = self
            .snapshot()?
            .iter()
            .flat_map(|resource| resource.leaf_paths())
            .collect();
        Ok(paths.into_iter().collect())
    }

    fn first_hit<T>(&self, path: &str, query: impl Fn(&Resource) -> Result<T>) -> Result<T> {
        for resource in self.snapshot()? {
            match query(resource.as_ref()) {
                Err(err) if err.is_not_found() => continue,
                other => return other,
            }
        }
        Err(EmbedError::not_found(path))
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("bundles", &self.len())
            .finish()
    }
}
