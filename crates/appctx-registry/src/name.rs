//! Service names and typed service keys
//!
//! Provides [`ServiceName`] for addressing registrations and [`ServiceKey`]
//! for compile-time-checked access to a known service.

use crate::error::RegistryError;
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// Name a service is registered under
///
/// Never empty. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceName(Arc<str>);

impl ServiceName {
    /// Create a validated name
    ///
    /// # Errors
    /// - `RegistryError::InvalidName` if `name` is empty or only whitespace
    pub fn new(name: impl AsRef<str>) -> Result<Self, RegistryError> {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        Ok(Self(Arc::from(name)))
    }

    /// Get name as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServiceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ServiceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ServiceName {
    type Error = RegistryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Typed handle to a known service
///
/// Pairs a name with the type its factory produces, so lookups through
/// [`ServiceRegistry::resolve`](crate::ServiceRegistry::resolve) need no
/// turbofish and cannot ask for the wrong type by accident.
///
/// ```
/// use appctx_registry::ServiceKey;
///
/// struct Clock;
/// const CLOCK: ServiceKey<Clock> = ServiceKey::new("clock");
/// assert_eq!(CLOCK.name(), "clock");
/// ```
pub struct ServiceKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> ServiceKey<T> {
    /// Create key for a name
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Get the registered name
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ServiceKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ServiceKey<T> {}

impl<T> fmt::Debug for ServiceKey<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKey")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Display for ServiceKey<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
