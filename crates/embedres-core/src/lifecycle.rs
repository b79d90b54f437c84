//! Registration records tying an embedded container to a registry.
//!
//! Each container has exactly one [`StaticResource`]. Its state machine is
//!
//! ```text
//! Unregistered --init--> Registered --fini--> Unregistered
//! ```
//!
//! There is no `Registered --init-->` or `Unregistered --fini-->` edge; both
//! are rejected with a lifecycle error. The record never copies or frees the
//! container bytes, and the bundle is only parsed on the first query after
//! registration.

use crate::error::{EmbedError, Result};
use crate::registry::ResourceRegistry;
use crate::resource::Resource;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Where a record is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Unregistered = 0,
    Registered = 1,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LifecycleState::Registered,
            _ => LifecycleState::Unregistered,
        }
    }
}

#[derive(Default)]
struct Binding {
    registry: Option<&'static ResourceRegistry>,
    resource: Option<Arc<Resource>>,
}

/// Bookkeeping for one embedded container.
///
/// Declared as a `static` next to its container (see
/// [`embed_resource_bundle!`](crate::embed_resource_bundle)) and driven by the
/// module's load and unload hooks, or explicitly through [`register`](Self::register).
pub struct StaticResource {
    data: &'static [u8],
    state: AtomicU8,
    registrations: AtomicUsize,
    binding: Mutex<Binding>,
}

impl StaticResource {
    pub const fn new(data: &'static [u8]) -> Self {
        Self {
            data,
            state: AtomicU8::new(LifecycleState::Unregistered as u8),
            registrations: AtomicUsize::new(0),
            binding: Mutex::new(Binding {
                registry: None,
                resource: None,
            }),
        }
    }

    /// The container bytes this record refers to.
    pub fn data(&self) -> &'static [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_registered(&self) -> bool {
        self.state() == LifecycleState::Registered
    }

    /// How many times this record has gone from unregistered to registered.
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::Acquire)
    }

    /// Register with the process-wide registry.
    pub fn init(&'static self) -> Result<()> {
        self.init_in(ResourceRegistry::global())
    }

    /// Register with a specific registry. The bundle is queued there and
    /// parsed on first query.
    pub fn init_in(&'static self, registry: &'static ResourceRegistry) -> Result<()> {
        self.state
            .compare_exchange(
                LifecycleState::Unregistered as u8,
                LifecycleState::Registered as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| EmbedError::AlreadyRegistered)?;

        match self.lock_binding() {
            Ok(mut binding) => binding.registry = Some(registry),
            Err(err) => {
                self.state
                    .store(LifecycleState::Unregistered as u8, Ordering::Release);
                return Err(err);
            }
        }

        if let Err(err) = registry.queue_static(self) {
            if let Ok(mut binding) = self.lock_binding() {
                binding.registry = None;
            }
            self.state
                .store(LifecycleState::Unregistered as u8, Ordering::Release);
            return Err(err);
        }

        self.registrations.fetch_add(1, Ordering::AcqRel);
        debug!("Registered embedded resource bundle ({} bytes)", self.data.len());
        Ok(())
    }

    /// Drop the registration and release the parsed bundle.
    pub fn fini(&'static self) -> Result<()> {
        self.teardown()?;
        debug!("Unregistered embedded resource bundle ({} bytes)", self.data.len());
        Ok(())
    }

    /// [`fini`](Self::fini) without logging.
    ///
    /// Unload hooks can run after thread-local storage is gone, where a
    /// subscriber would panic, so the hook path goes through here.
    pub(crate) fn teardown(&'static self) -> Result<()> {
        self.state
            .compare_exchange(
                LifecycleState::Registered as u8,
                LifecycleState::Unregistered as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| EmbedError::NotRegistered)?;

        // Take what the registry needs, then release our lock before calling
        // into it: the registry locks records while realising them.
        let (registry, resource) = {
            let mut binding = self.lock_binding()?;
            let binding = std::mem::take(&mut *binding);
            (binding.registry, binding.resource)
        };

        if let Some(registry) = registry {
            registry.release_static(self, resource.as_ref())?;
        }
        Ok(())
    }

    /// Register and hand back a guard that unregisters on drop.
    pub fn register(&'static self) -> Result<Registration> {
        self.init()?;
        Ok(Registration { record: self })
    }

    pub fn register_in(&'static self, registry: &'static ResourceRegistry) -> Result<Registration> {
        self.init_in(registry)?;
        Ok(Registration { record: self })
    }

    /// The parsed bundle, parsing it now if no query has done so yet.
    pub fn resource(&self) -> Result<Arc<Resource>> {
        if !self.is_registered() {
            return Err(EmbedError::NotRegistered);
        }
        self.realize()
    }

    /// Parse the container once and cache the handle.
    ///
    /// Checked under the binding lock, so a record torn down concurrently is
    /// either seen as unregistered here or has its handle released by `fini`.
    pub(crate) fn realize(&self) -> Result<Arc<Resource>> {
        let mut binding = self.lock_binding()?;
        if !self.is_registered() {
            return Err(EmbedError::NotRegistered);
        }
        if let Some(resource) = &binding.resource {
            return Ok(Arc::clone(resource));
        }

        let resource = Arc::new(Resource::from_static(self.data)?);
        binding.resource = Some(Arc::clone(&resource));
        Ok(resource)
    }

    fn lock_binding(&self) -> Result<MutexGuard<'_, Binding>> {
        self.binding.lock().map_err(|_| EmbedError::Poisoned)
    }
}

impl std::fmt::Debug for StaticResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticResource")
            .field("len", &self.data.len())
            .field("state", &self.state())
            .field("registrations", &self.registrations())
            .finish()
    }
}

/// An explicit registration, for hosts that own the module lifetime.
///
/// Dropping it unregisters the record.
#[must_use = "dropping a Registration unregisters the bundle"]
#[derive(Debug)]
pub struct Registration {
    record: &'static StaticResource,
}

impl Registration {
    pub fn record(&self) -> &'static StaticResource {
        self.record
    }

    pub fn resource(&self) -> Result<Arc<Resource>> {
        self.record.resource()
    }

    /// Unregister now and report failures instead of logging them.
    pub fn unregister(self) -> Result<()> {
        let record = self.record;
        std::mem::forget(self);
        record.fini()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Err(err) = self.record.fini() {
            warn!("Failed to unregister resource bundle: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gvdb::tests::DOCK_BUNDLE;

    fn leaked_record() -> &'static StaticResource {
        Box::leak(Box::new(StaticResource::new(DOCK_BUNDLE)))
    }

    fn leaked_registry() -> &'static ResourceRegistry {
        Box::leak(Box::new(ResourceRegistry::new()))
    }

    #[test]
    fn test_new_record_is_unregistered() {
        let record = leaked_record();
        assert_eq!(record.state(), LifecycleState::Unregistered);
        assert_eq!(record.registrations(), 0);
        assert_eq!(record.len(), DOCK_BUNDLE.len());
        assert!(record.resource().unwrap_err().is_lifecycle_violation());
    }

    #[test]
    fn test_init_then_fini() {
        let (record, registry) = (leaked_record(), leaked_registry());

        record.init_in(registry).unwrap();
        assert_eq!(record.state(), LifecycleState::Registered);
        assert_eq!(record.registrations(), 1);

        record.fini().unwrap();
        assert_eq!(record.state(), LifecycleState::Unregistered);
    }

    #[test]
    fn test_double_init_rejected() {
        let (record, registry) = (leaked_record(), leaked_registry());
        record.init_in(registry).unwrap();

        let err = record.init_in(registry).unwrap_err();
        assert!(matches!(err, EmbedError::AlreadyRegistered));
        assert_eq!(record.registrations(), 1);
    }

    #[test]
    fn test_fini_without_init_rejected() {
        let record = leaked_record();
        assert!(matches!(record.fini().unwrap_err(), EmbedError::NotRegistered));

        let registry = leaked_registry();
        record.init_in(registry).unwrap();
        record.fini().unwrap();
        assert!(matches!(record.fini().unwrap_err(), EmbedError::NotRegistered));
    }

    #[test]
    fn test_reload_is_symmetric() {
        let (record, registry) = (leaked_record(), leaked_registry());

        for round in 1..=2 {
            record.init_in(registry).unwrap();
            assert!(registry.lookup_data("/io/elementary/dock/Application.css").is_ok());
            record.fini().unwrap();
            assert_eq!(record.registrations(), round);
        }
    }

    #[test]
    fn test_resource_is_parsed_once() {
        let (record, registry) = (leaked_record(), leaked_registry());
        record.init_in(registry).unwrap();

        let first = record.resource().unwrap();
        let second = record.resource().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_registration_guard_unregisters_on_drop() {
        let (record, registry) = (leaked_record(), leaked_registry());
        {
            let registration = record.register_in(registry).unwrap();
            assert!(registration.resource().is_ok());
            assert!(record.is_registered());
        }
        assert!(!record.is_registered());
        assert!(registry
            .lookup_data("/io/elementary/dock/Application.css")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_registration_explicit_unregister() {
        let (record, registry) = (leaked_record(), leaked_registry());
        let registration = record.register_in(registry).unwrap();
        registration.unregister().unwrap();
        assert_eq!(record.state(), LifecycleState::Unregistered);
    }
}
