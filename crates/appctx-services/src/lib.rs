//! appctx Services
//!
//! The application's shared services and the context that hands them out.
//!
//! # Services
//!
//! - [`FlagsService`]: enabled experiments
//! - [`ReportingService`]: timing, interaction, and error reports, tagged with experiments
//! - [`EventEmitter`]: synchronous in-process event bus
//!
//! Each is registered lazily by [`init_app_context`] and reached through the
//! typed accessors on [`AppContext`].
//!
//! # Example
//!
//! ```rust
//! use appctx_services::{AppConfig, AppContext};
//!
//! let config = AppConfig::new().with_experiments(["new-diff-view"]);
//! let context = AppContext::new(config)?;
//!
//! let reporting = context.reporting_service()?;
//! reporting.app_started();
//!
//! assert!(context.flags_service()?.is_enabled("new-diff-view"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod error;
pub mod event_emitter;
pub mod flags;
pub mod reporting;

// Re-exports for convenience
pub use config::{AppConfig, ReportingConfig, EXPERIMENTS_ENV};
pub use context::{init_app_context, AppContext, EVENT_EMITTER, FLAGS, KNOWN_SERVICES, REPORTING};
pub use error::ServicesError;
pub use event_emitter::{EventEmitter, ListenerId};
pub use flags::FlagsService;
pub use reporting::{EventKind, ReportEvent, ReportingService};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with appctx services
    pub use crate::{
        AppConfig, AppContext, EventEmitter, FlagsService, ReportingService, ServicesError,
    };
    pub use appctx_registry::{RegistryError, ServiceRegistry};
}
