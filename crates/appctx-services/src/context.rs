//! Application context
//!
//! Declares the known services and wires them into a [`ServiceRegistry`].
//! [`AppContext`] is the typed facade the rest of an application uses to
//! reach them; nothing outside the factories below constructs a service.

use crate::config::AppConfig;
use crate::error::ServicesError;
use crate::event_emitter::EventEmitter;
use crate::flags::FlagsService;
use crate::reporting::ReportingService;
use appctx_registry::{Registrations, RegistryError, ServiceKey, ServiceRegistry};
use std::sync::Arc;

/// Experiment flags
pub const FLAGS: ServiceKey<FlagsService> = ServiceKey::new("flagsService");

/// Reporting, depends on [`FLAGS`]
pub const REPORTING: ServiceKey<ReportingService> = ServiceKey::new("reportingService");

/// In-process event bus
pub const EVENT_EMITTER: ServiceKey<EventEmitter> = ServiceKey::new("eventEmitter");

/// Names of every known service, in declaration order
pub const KNOWN_SERVICES: [&str; 3] = [FLAGS.name(), REPORTING.name(), EVENT_EMITTER.name()];

/// Register the known services
///
/// Only factories are stored; each service is built on first lookup. The
/// services are registered together: if any name is taken, none is added.
///
/// # Errors
/// - `RegistryError::DuplicateRegistration` if any known name is already registered
pub fn init_app_context(registry: &ServiceRegistry, config: &AppConfig) -> Result<(), RegistryError> {
    let mut services = Registrations::new();

    let experiments = config.enabled_experiments.clone();
    services.provide(FLAGS, move |_| Ok(FlagsService::new(&experiments)))?;

    let reporting = config.reporting;
    services.provide(REPORTING, move |r| {
        Ok(ReportingService::new(r.resolve(FLAGS)?, reporting))
    })?;

    services.provide(EVENT_EMITTER, |_| Ok(EventEmitter::new()))?;

    registry.register_all(services)?;
    tracing::debug!(services = registry.len(), "app context initialized");
    Ok(())
}

/// Typed access to the application's services
///
/// Cloning shares the underlying registry.
#[derive(Debug, Clone)]
pub struct AppContext {
    registry: Arc<ServiceRegistry>,
}

impl AppContext {
    /// Create a fresh registry with the known services
    ///
    /// # Errors
    /// - `ServicesError::Registry` if registration fails
    pub fn new(config: AppConfig) -> Result<Self, ServicesError> {
        let registry = Arc::new(ServiceRegistry::with_label("app"));
        init_app_context(&registry, &config)?;
        Ok(Self { registry })
    }

    /// Wrap a registry that was already initialized
    #[inline]
    #[must_use]
    pub fn from_registry(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Underlying registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Flags service
    ///
    /// # Errors
    /// Propagates the registry error if construction fails.
    #[inline]
    pub fn flags_service(&self) -> Result<Arc<FlagsService>, RegistryError> {
        self.registry.resolve(FLAGS)
    }

    /// Reporting service, building the flags service first if needed
    ///
    /// # Errors
    /// Propagates the registry error if construction fails.
    #[inline]
    pub fn reporting_service(&self) -> Result<Arc<ReportingService>, RegistryError> {
        self.registry.resolve(REPORTING)
    }

    /// Event emitter
    ///
    /// # Errors
    /// Propagates the registry error if construction fails.
    #[inline]
    pub fn event_emitter(&self) -> Result<Arc<EventEmitter>, RegistryError> {
        self.registry.resolve(EVENT_EMITTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appctx_registry::ServiceState;

    #[test]
    fn init_registers_without_constructing() {
        let registry = ServiceRegistry::new();
        init_app_context(&registry, &AppConfig::new()).unwrap();

        assert_eq!(registry.len(), KNOWN_SERVICES.len());
        for name in KNOWN_SERVICES {
            assert_eq!(registry.state(name), ServiceState::Registered);
        }
    }

    #[test]
    fn init_twice_fails() {
        let registry = ServiceRegistry::new();
        init_app_context(&registry, &AppConfig::new()).unwrap();

        let err = init_app_context(&registry, &AppConfig::new()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration(ref n) if n.as_str() == "flagsService"));
    }

    #[test]
    fn init_after_conflict_adds_nothing() {
        let registry = ServiceRegistry::new();
        registry.register("reportingService", |_| Ok(())).unwrap();

        let err = init_app_context(&registry, &AppConfig::new()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration(ref n) if n.as_str() == "reportingService"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("flagsService"));
    }

    #[test]
    fn reporting_pulls_in_flags() {
        let context = AppContext::new(AppConfig::new().with_experiments(["x"])).unwrap();

        let reporting = context.reporting_service().unwrap();
        assert!(context.registry().is_constructed("flagsService"));
        assert!(!context.registry().is_constructed("eventEmitter"));

        let flags = context.flags_service().unwrap();
        assert!(Arc::ptr_eq(reporting.flags(), &flags));
        assert!(flags.is_enabled("x"));
    }

    #[test]
    fn clones_share_services() {
        let context = AppContext::new(AppConfig::new()).unwrap();
        let other = context.clone();

        let a = context.event_emitter().unwrap();
        let b = other.event_emitter().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
