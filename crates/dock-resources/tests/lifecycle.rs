//! Integration tests for the linked dock bundle.
//!
//! The test binary is the host module here: by the time any test runs, the
//! load hook has fired and the bundle is in the global registry. None of
//! these tests unregister it, since they share the process.

use dock_resources::{
    dock_resource, dock_static_resource, dock_stylesheet, DOCK_RESOURCE_DATA, DOCK_RESOURCE_LEN,
    DOCK_STYLESHEET_PATH,
};
use embedres::{
    EmbedError, HookStrategy, LifecycleState, ResourceRegistry, StaticResource, ACTIVE_STRATEGY,
};

const EXPECTED_CSS: &str = "window {\n    background-color: transparent;\n}\n";

fn hooks_available() -> bool {
    ACTIVE_STRATEGY != HookStrategy::Unsupported
}

#[test]
fn test_registered_before_first_test() {
    if !hooks_available() {
        return;
    }
    let record = dock_static_resource();
    assert_eq!(record.state(), LifecycleState::Registered);
    assert_eq!(record.registrations(), 1);
}

#[test]
fn test_declared_length_matches_packed_file() {
    assert_eq!(
        DOCK_RESOURCE_LEN,
        include_bytes!("../resources/dock.gresource").len()
    );
    assert_eq!(DOCK_RESOURCE_DATA.len(), DOCK_RESOURCE_LEN);
}

#[test]
fn test_container_alignment() {
    assert_eq!(DOCK_RESOURCE_DATA.as_bytes().as_ptr() as usize % 8, 0);
}

#[test]
fn test_global_lookup_returns_stylesheet() {
    if !hooks_available() {
        return;
    }
    let data = ResourceRegistry::global()
        .lookup_data(DOCK_STYLESHEET_PATH)
        .unwrap();
    assert_eq!(data.len(), 46);
    assert_eq!(&data[..], EXPECTED_CSS.as_bytes());
    assert_eq!(dock_stylesheet().unwrap(), EXPECTED_CSS);
}

#[test]
fn test_global_lookup_of_missing_path() {
    let err = ResourceRegistry::global()
        .lookup_data("/io/elementary/dock/missing.css")
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("missing.css"));
}

#[test]
fn test_global_directory_listing() {
    if !hooks_available() {
        return;
    }
    let registry = ResourceRegistry::global();
    assert_eq!(
        registry.enumerate_children("/io/elementary/").unwrap(),
        vec!["dock/".to_string()]
    );
    assert!(registry.has_children("/io/elementary/dock"));
    assert!(!registry.has_children(DOCK_STYLESHEET_PATH));
}

#[test]
fn test_info_serializes() {
    if !hooks_available() {
        return;
    }
    let info = dock_resource().unwrap().get_info(DOCK_STYLESHEET_PATH).unwrap();
    let json = serde_json::to_value(info).unwrap();
    assert_eq!(json["size"], 46);
    assert_eq!(json["flags"], 1);
}

/// Drives a second record over the same container the way a host loader
/// would: load, queries, unload, then a reload.
#[test]
fn test_simulated_loader_cycle() {
    let record: &'static StaticResource =
        Box::leak(Box::new(StaticResource::new(DOCK_RESOURCE_DATA.as_bytes())));
    let registry: &'static ResourceRegistry = Box::leak(Box::new(ResourceRegistry::new()));

    // Before load: nothing to find.
    assert!(registry.lookup_data(DOCK_STYLESHEET_PATH).unwrap_err().is_not_found());

    record.init_in(registry).unwrap();
    assert!(matches!(
        record.init_in(registry).unwrap_err(),
        EmbedError::AlreadyRegistered
    ));
    assert_eq!(registry.lookup_data(DOCK_STYLESHEET_PATH).unwrap().len(), 46);

    record.fini().unwrap();
    assert!(matches!(record.fini().unwrap_err(), EmbedError::NotRegistered));
    assert!(registry.lookup_data(DOCK_STYLESHEET_PATH).unwrap_err().is_not_found());
    assert!(registry.is_empty());

    // The container is untouched and can be registered again.
    record.init_in(registry).unwrap();
    assert_eq!(record.registrations(), 2);
    assert_eq!(registry.lookup_data(DOCK_STYLESHEET_PATH).unwrap().len(), 46);
    record.fini().unwrap();
}

#[test]
fn test_explicit_registration_guard() {
    let record: &'static StaticResource =
        Box::leak(Box::new(StaticResource::new(DOCK_RESOURCE_DATA.as_bytes())));
    let registry: &'static ResourceRegistry = Box::leak(Box::new(ResourceRegistry::new()));

    let registration = record.register_in(registry).unwrap();
    let resource = registration.resource().unwrap();
    assert_eq!(
        resource.enumerate_children("/io/elementary/dock/").unwrap(),
        vec!["Application.css".to_string()]
    );

    drop(registration);
    assert_eq!(record.state(), LifecycleState::Unregistered);
    assert!(registry.is_empty());
}
