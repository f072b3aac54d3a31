//! Type-erased service instances
//!
//! Provides [`Service`], the opaque value a registry hands out for a name.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased service instance
///
/// Cloning is cheap and preserves identity: every clone points at the
/// instance the factory produced.
#[derive(Clone)]
pub struct Service {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Service {
    /// Wrap a freshly constructed value
    #[inline]
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value
    #[inline]
    #[must_use]
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Name of the concrete type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check the concrete type
    #[inline]
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrow as concrete type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Convert into a typed handle, keeping identity
    ///
    /// Returns the untouched service on type mismatch.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map_err(|value| Self { value, type_name })
    }

    /// Check if two handles point at the same instance
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_keeps_identity() {
        let shared = Arc::new(String::from("hello"));
        let service = Service::from_arc(Arc::clone(&shared));

        let typed = service.downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(&typed, &shared));
    }

    #[test]
    fn downcast_wrong_type_returns_service() {
        let service = Service::new(42u32);
        let back = service.downcast::<String>().unwrap_err();
        assert!(back.is::<u32>());
        assert_eq!(back.type_name(), "u32");
    }

    #[test]
    fn clones_are_ptr_eq() {
        let a = Service::new(vec![1, 2, 3]);
        let b = a.clone();
        let c = Service::new(vec![1, 2, 3]);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(b.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
    }
}
