//! appctx Service Registry
//!
//! Lazily constructed, named singleton services with dependency wiring.
//!
//! # Core Concepts
//!
//! - [`ServiceRegistry`]: name → factory, and after first access the cached instance
//! - [`ServiceKey`]: typed handle to a known service
//! - [`Service`]: type-erased, shared instance
//! - [`ServiceState`]: per-name lifecycle (`registered → constructing → constructed`)
//! - [`RegistryError`]: duplicate names, unknown names, factory failures, cycles
//!
//! # Example
//!
//! ```rust
//! use appctx_registry::{ServiceKey, ServiceRegistry};
//!
//! struct Flags(Vec<String>);
//! struct Reporting { experiments: usize }
//!
//! const FLAGS: ServiceKey<Flags> = ServiceKey::new("flagsService");
//! const REPORTING: ServiceKey<Reporting> = ServiceKey::new("reportingService");
//!
//! let registry = ServiceRegistry::new();
//!
//! // Declaration order is free; dependencies resolve on first access.
//! registry.provide(REPORTING, |r| {
//!     let flags = r.resolve(FLAGS)?;
//!     Ok(Reporting { experiments: flags.0.len() })
//! })?;
//! registry.provide(FLAGS, |_| Ok(Flags(vec!["new-ui".into()])))?;
//!
//! let reporting = registry.resolve(REPORTING)?;
//! assert_eq!(reporting.experiments, 1);
//! assert!(registry.is_constructed("flagsService"));
//! # Ok::<(), appctx_registry::RegistryError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cycle;
mod error;
mod name;
mod registry;
mod service;
mod state;

// Re-exports
pub use error::{BoxError, RegistryError, SharedError};
pub use name::{ServiceKey, ServiceName};
pub use registry::{Registrations, RegistryStats, ServiceRegistry};
pub use service::Service;
pub use state::ServiceState;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registering and resolving services
    pub use crate::{
        BoxError, Registrations, RegistryError, Service, ServiceKey, ServiceRegistry, ServiceState,
    };
}
