//! Error types for the service registry
//!
//! Provides [`RegistryError`], returned by every fallible registry operation:
//! - Registration conflicts and malformed names
//! - Lookups of unknown services or of the wrong type
//! - Factory failures (never cached)
//! - Construction cycles

use crate::name::ServiceName;
use std::error::Error;
use std::sync::Arc;

/// Error type factories return
///
/// Any error that is `Send + Sync` converts into it with `?`, including
/// [`RegistryError`] from a nested lookup.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Shared factory failure
///
/// Kept behind an `Arc` so a single failed attempt can be handed to every
/// caller that was waiting on it.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Registry error
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Name already taken by an earlier registration
    #[error("service {0} already registered")]
    DuplicateRegistration(ServiceName),

    /// Lookup of a name nobody registered
    ///
    /// Carries the name as given, which may be one no registration accepts.
    #[error("service {0:?} is not registered")]
    UnknownService(String),

    /// Factory returned an error
    #[error("failed to construct service {name}: {source}")]
    Construction {
        /// Service whose factory failed
        name: ServiceName,
        /// Whatever the factory returned
        #[source]
        source: SharedError,
    },

    /// Factory transitively requested a service that is still being built
    #[error("cyclic dependency: {}", format_path(path))]
    CyclicDependency {
        /// Names along the cycle, first and last are the same service
        path: Vec<ServiceName>,
    },

    /// Typed lookup asked for a different type than the factory produced
    #[error("service {name} is not of type {expected}")]
    TypeMismatch {
        /// Service that was looked up
        name: ServiceName,
        /// Requested type
        expected: &'static str,
    },

    /// Empty or whitespace-only service name
    #[error("invalid service name: {0:?}")]
    InvalidName(String),
}

impl RegistryError {
    /// Wrap a factory failure
    #[inline]
    pub fn construction(name: ServiceName, source: BoxError) -> Self {
        Self::Construction {
            name,
            source: Arc::from(source),
        }
    }

    /// Innermost registry error
    ///
    /// Factories that fail because a nested lookup failed produce
    /// `Construction` errors wrapping other registry errors. This follows
    /// that chain down to the last registry error in it.
    #[must_use]
    pub fn root_cause(&self) -> &RegistryError {
        let mut current = self;
        while let Self::Construction { source, .. } = current {
            match source.downcast_ref::<RegistryError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// Check if this error, or one it wraps, is a dependency cycle
    #[inline]
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        matches!(self.root_cause(), Self::CyclicDependency { .. })
    }

    /// Check if a later lookup may succeed
    ///
    /// Only factory failures qualify, and only when they are not caused by a
    /// cycle, since the cycle will still be there on the next attempt.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Construction { .. }) && !self.is_cyclic()
    }

    /// Service the error is about, if it names one
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::DuplicateRegistration(name)
            | Self::Construction { name, .. }
            | Self::TypeMismatch { name, .. } => Some(name.as_str()),
            Self::UnknownService(name) => Some(name),
            Self::CyclicDependency { path } => path.first().map(ServiceName::as_str),
            Self::InvalidName(_) => None,
        }
    }
}

fn format_path(path: &[ServiceName]) -> String {
    path.iter()
        .map(ServiceName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
