//! Process-wide registry of resource bundles.
//!
//! Bundles enter the registry in two ways:
//! - **Parsed resources** registered directly with [`ResourceRegistry::register`]
//! - **Static records** queued by [`StaticResource::init`](crate::StaticResource::init),
//!   usually from a module load hook, and parsed on the first query
//!
//! Queries walk the registered bundles from the most recently registered to
//! the oldest, so a later bundle can shadow a path from an earlier one.

pub mod resource_registry;

pub use resource_registry::ResourceRegistry;
