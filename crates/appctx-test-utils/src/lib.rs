//! Testing utilities for appctx workspace
//!
//! Shared test helpers, fixtures, and factories.

#![allow(missing_docs)]

use appctx_registry::{BoxError, ServiceRegistry};
use appctx_services::{AppConfig, AppContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts factory invocations
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations so far
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Record one invocation, returning how many came before it
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    /// Factory producing `value` and recording each call
    pub fn factory<T>(
        &self,
        value: T,
    ) -> impl Fn(&ServiceRegistry) -> Result<T, BoxError> + Send + Sync + 'static
    where
        T: Clone + Send + Sync + 'static,
    {
        let counter = self.clone();
        move |_: &ServiceRegistry| {
            counter.hit();
            Ok(value.clone())
        }
    }

    /// Factory that fails its first `failures` calls, then produces the call number
    pub fn flaky_factory(
        &self,
        failures: usize,
    ) -> impl Fn(&ServiceRegistry) -> Result<usize, BoxError> + Send + Sync + 'static {
        let counter = self.clone();
        move |_: &ServiceRegistry| {
            let attempt = counter.hit() + 1;
            if attempt <= failures {
                Err(format!("attempt {attempt} failed").into())
            } else {
                Ok(attempt)
            }
        }
    }
}

pub fn fresh_registry() -> ServiceRegistry {
    ServiceRegistry::with_label("test")
}

pub fn setup_test_context() -> AppContext {
    AppContext::new(AppConfig::new()).unwrap()
}

pub fn setup_test_context_with_experiments(experiments: &[&str]) -> AppContext {
    let config = AppConfig::new().with_experiments(experiments.iter().copied());
    AppContext::new(config).unwrap()
}

/// Install a test-friendly subscriber; repeated calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
