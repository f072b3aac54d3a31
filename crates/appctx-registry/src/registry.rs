//! Lazy singleton service registry
//!
//! Provides [`ServiceRegistry`]: a mapping from service name to a factory and,
//! after first access, the instance that factory produced.

use crate::cycle::{self, Frame, RegistryId};
use crate::error::{BoxError, RegistryError};
use crate::name::{ServiceKey, ServiceName};
use crate::service::Service;
use crate::state::ServiceState;
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Type-erased factory as stored in the registry
type Factory = Arc<dyn Fn(&ServiceRegistry) -> Result<Service, BoxError> + Send + Sync>;

/// Registry statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Registered services
    pub registered: usize,
    /// Services with a cached instance
    pub constructed: usize,
    /// Factory invocations, successful or not
    pub construction_attempts: u64,
    /// Factory invocations that returned an error or panicked
    pub construction_failures: u64,
    /// Lookups answered from the cache
    pub cache_hits: u64,
}

enum Slot {
    Registered,
    Constructing { owner: ThreadId, attempt: u64 },
    Constructed(Service),
}

struct Entry {
    factory: Factory,
    slot: Slot,
    /// Attempts started so far, numbers each `Constructing` phase
    attempts: u64,
    /// Most recent failure and the attempt that produced it
    last_failure: Option<(u64, RegistryError)>,
}

impl Entry {
    fn state(&self) -> ServiceState {
        match self.slot {
            Slot::Registered => ServiceState::Registered,
            Slot::Constructing { .. } => ServiceState::Constructing,
            Slot::Constructed(_) => ServiceState::Constructed,
        }
    }

    fn transition(&mut self, slot: Slot) {
        let next = match slot {
            Slot::Registered => ServiceState::Registered,
            Slot::Constructing { .. } => ServiceState::Constructing,
            Slot::Constructed(_) => ServiceState::Constructed,
        };
        debug_assert!(
            self.state().can_transition_to(next),
            "illegal service transition: {} -> {}",
            self.state(),
            next
        );
        self.slot = slot;
    }
}

#[derive(Default)]
struct Inner {
    entries: IndexMap<ServiceName, Entry>,
    /// Service each blocked thread is waiting for
    waiting: HashMap<ThreadId, ServiceName>,
    stats: RegistryStats,
}

fn erase<T, F>(factory: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn(&ServiceRegistry) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Arc::new(move |registry: &ServiceRegistry| factory(registry).map(Service::new))
}

/// Factories collected for [`ServiceRegistry::register_all`]
///
/// Names are validated and checked against each other as they are added;
/// conflicts with the registry are checked when the batch is applied.
#[derive(Default)]
pub struct Registrations {
    pending: Vec<(ServiceName, Factory)>,
}

impl Registrations {
    /// Create empty batch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory to the batch
    ///
    /// # Errors
    /// - `RegistryError::InvalidName` if `name` is empty
    /// - `RegistryError::DuplicateRegistration` if the batch already holds `name`
    pub fn register<T, F>(&mut self, name: impl AsRef<str>, factory: F) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let name = ServiceName::new(name)?;
        if self.pending.iter().any(|(pending, _)| *pending == name) {
            return Err(RegistryError::DuplicateRegistration(name));
        }
        self.pending.push((name, erase(factory)));
        Ok(())
    }

    /// Add a factory under a typed key
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    #[inline]
    pub fn provide<T, F>(&mut self, key: ServiceKey<T>, factory: F) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register(key.name(), factory)
    }

    /// Names in the batch, in insertion order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.pending.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Number of factories in the batch
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if the batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl fmt::Debug for Registrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrations")
            .field("names", &self.names())
            .finish()
    }
}

/// Outcome of one inspection of an entry under the lock
enum Step {
    Ready(Service),
    Failed(RegistryError),
    Build {
        name: ServiceName,
        factory: Factory,
        attempt: u64,
    },
    Wait {
        name: ServiceName,
        attempt: u64,
    },
}

/// Lazy singleton service registry
///
/// Services are registered by name with a factory. Nothing is built until the
/// first [`get`](Self::get) for that name; the result is cached and every later
/// lookup returns the same instance.
///
/// Factories receive the registry and pull their dependencies through it, so
/// registration order does not matter as long as the dependencies do not form
/// a cycle. Cycles are reported as [`RegistryError::CyclicDependency`].
///
/// The registry is `Send + Sync`. Concurrent first lookups of one name run the
/// factory once; every caller gets the same instance, or the same failure.
/// Failures are not cached: the next lookup after a failed attempt retries.
///
/// # Example
///
/// ```
/// use appctx_registry::ServiceRegistry;
///
/// let registry = ServiceRegistry::new();
/// registry.register("greeting", |_| Ok(String::from("hello")))?;
/// registry.register("shout", |r| {
///     let greeting = r.get_as::<String>("greeting")?;
///     Ok(greeting.to_uppercase())
/// })?;
///
/// assert_eq!(*registry.get_as::<String>("shout")?, "HELLO");
/// # Ok::<(), appctx_registry::RegistryError>(())
/// ```
pub struct ServiceRegistry {
    id: RegistryId,
    label: String,
    inner: Mutex<Inner>,
    ready: Condvar,
}

impl ServiceRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_label("default")
    }

    /// Create empty registry with a label for log output
    #[must_use]
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            id: RegistryId::next(),
            label: label.into(),
            inner: Mutex::new(Inner::default()),
            ready: Condvar::new(),
        }
    }

    /// Label given at creation
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Register a service factory
    ///
    /// The factory is stored, not invoked. It may be invoked again after a
    /// failed attempt, so it must be safe to re-run.
    ///
    /// # Errors
    /// - `RegistryError::InvalidName` if `name` is empty
    /// - `RegistryError::DuplicateRegistration` if `name` is already taken
    pub fn register<T, F>(&self, name: impl AsRef<str>, factory: F) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let name = ServiceName::new(name)?;
        self.insert(name, erase(factory))
    }

    /// Register a factory under a typed key
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn provide<T, F>(&self, key: ServiceKey<T>, factory: F) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register(key.name(), factory)
    }

    /// Register a batch of factories, all or none
    ///
    /// Every name is checked under one lock before anything is inserted, so a
    /// conflict leaves the registry as it was.
    ///
    /// # Errors
    /// - `RegistryError::DuplicateRegistration` for the first batch name already taken
    pub fn register_all(&self, batch: Registrations) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        if let Some((name, _)) = batch
            .pending
            .iter()
            .find(|(name, _)| inner.entries.contains_key(name))
        {
            return Err(RegistryError::DuplicateRegistration(name.clone()));
        }

        for (name, factory) in batch.pending {
            self.insert_locked(&mut inner, name, factory);
        }
        Ok(())
    }

    fn insert(&self, name: ServiceName, factory: Factory) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateRegistration(name));
        }
        self.insert_locked(&mut inner, name, factory);
        Ok(())
    }

    fn insert_locked(&self, inner: &mut Inner, name: ServiceName, factory: Factory) {
        tracing::debug!(registry = %self.label, service = %name, "registered service");
        inner.entries.insert(
            name,
            Entry {
                factory,
                slot: Slot::Registered,
                attempts: 0,
                last_failure: None,
            },
        );
    }

    /// Get the instance for a name, constructing it on first access
    ///
    /// # Errors
    /// - `RegistryError::UnknownService` if `name` was never registered
    /// - `RegistryError::Construction` if the factory failed; not cached
    /// - `RegistryError::CyclicDependency` if construction would recurse into itself
    pub fn get(&self, name: &str) -> Result<Service, RegistryError> {
        let me = thread::current().id();
        let mut inner = self.inner.lock();
        let mut awaited = None;

        loop {
            match self.step(&mut inner, name, me, awaited) {
                Step::Ready(service) => {
                    // Waiters were handed a fresh instance, not a cached one.
                    if awaited.is_none() {
                        inner.stats.cache_hits += 1;
                        tracing::trace!(registry = %self.label, service = name, "cache hit");
                    }
                    return Ok(service);
                }
                Step::Failed(err) => return Err(err),
                Step::Wait { name, attempt } => {
                    awaited = Some(attempt);
                    inner.waiting.insert(me, name);
                    self.ready.wait(&mut inner);
                    inner.waiting.remove(&me);
                }
                Step::Build {
                    name,
                    factory,
                    attempt,
                } => {
                    inner.stats.construction_attempts += 1;
                    drop(inner);
                    return self.construct(name, &factory, attempt);
                }
            }
        }
    }

    /// Get the instance for a name as a concrete type
    ///
    /// # Errors
    /// Same as [`get`](Self::get), plus `RegistryError::TypeMismatch` if the
    /// factory produced a different type.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, RegistryError> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| match ServiceName::new(name) {
                Ok(name) => RegistryError::TypeMismatch {
                    name,
                    expected: std::any::type_name::<T>(),
                },
                Err(err) => err,
            })
    }

    /// Get the instance for a typed key
    ///
    /// # Errors
    /// Same as [`get_as`](Self::get_as).
    #[inline]
    pub fn resolve<T: Any + Send + Sync>(&self, key: ServiceKey<T>) -> Result<Arc<T>, RegistryError> {
        self.get_as::<T>(key.name())
    }

    /// Check if a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().entries.contains_key(name)
    }

    /// Lifecycle state of a name
    #[must_use]
    pub fn state(&self, name: &str) -> ServiceState {
        self.inner
            .lock()
            .entries
            .get(name)
            .map_or(ServiceState::Unregistered, Entry::state)
    }

    /// Check if a name has a cached instance
    #[inline]
    #[must_use]
    pub fn is_constructed(&self, name: &str) -> bool {
        self.state(name).is_constructed()
    }

    /// Registered names, in registration order
    #[must_use]
    pub fn names(&self) -> Vec<ServiceName> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Names with their current state, in registration order
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ServiceName, ServiceState)> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.state()))
            .collect()
    }

    /// Number of registered services
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Get registry statistics
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.lock();
        RegistryStats {
            registered: inner.entries.len(),
            constructed: inner
                .entries
                .values()
                .filter(|entry| entry.state().is_constructed())
                .count(),
            ..inner.stats
        }
    }

    /// Inspect `name` under the lock and decide what the caller does next
    fn step(&self, inner: &mut Inner, name: &str, me: ThreadId, awaited: Option<u64>) -> Step {
        let Some((_, key, entry)) = inner.entries.get_full_mut(name) else {
            return Step::Failed(RegistryError::UnknownService(name.to_string()));
        };

        if let Slot::Constructed(service) = &entry.slot {
            return Step::Ready(service.clone());
        }

        // The attempt we waited on failed: hand out the same failure.
        if let (Some(waited), Some((failed, err))) = (awaited, &entry.last_failure) {
            if waited == *failed {
                return Step::Failed(err.clone());
            }
        }

        let (owner, attempt) = match entry.slot {
            Slot::Constructing { owner, attempt } => (owner, attempt),
            _ => {
                entry.attempts += 1;
                let attempt = entry.attempts;
                entry.transition(Slot::Constructing { owner: me, attempt });
                return Step::Build {
                    name: key.clone(),
                    factory: Arc::clone(&entry.factory),
                    attempt,
                };
            }
        };
        let key = key.clone();

        if owner == me {
            return Step::Failed(RegistryError::CyclicDependency {
                path: cycle::reentrant_path(self.id, &key),
            });
        }

        let owner_of = |service: &ServiceName| match inner.entries.get(service)?.slot {
            Slot::Constructing { owner, .. } => Some(owner),
            _ => None,
        };
        if let Some(path) = cycle::wait_path(me, &key, &inner.waiting, owner_of) {
            return Step::Failed(RegistryError::CyclicDependency { path });
        }

        Step::Wait { name: key, attempt }
    }

    /// Run a factory outside the lock and publish its outcome
    fn construct(
        &self,
        name: ServiceName,
        factory: &Factory,
        attempt: u64,
    ) -> Result<Service, RegistryError> {
        let span = tracing::debug_span!("construct", registry = %self.label, service = %name, attempt);
        let _enter = span.enter();

        let mut guard = AttemptGuard {
            registry: self,
            name: &name,
            attempt,
            armed: true,
        };
        let outcome = {
            let _frame = Frame::enter(self.id, name.clone());
            factory(self)
        };
        guard.armed = false;

        let result = {
            let mut inner = self.inner.lock();
            let inner = &mut *inner;
            match (inner.entries.get_mut(&name), outcome) {
                (Some(entry), Ok(service)) => {
                    entry.transition(Slot::Constructed(service.clone()));
                    entry.last_failure = None;
                    tracing::debug!(service_type = service.type_name(), "constructed service");
                    Ok(service)
                }
                (Some(entry), Err(source)) => {
                    let err = RegistryError::construction(name.clone(), source);
                    entry.transition(Slot::Registered);
                    entry.last_failure = Some((attempt, err.clone()));
                    inner.stats.construction_failures += 1;
                    Err(err)
                }
                // Entries are never removed.
                (None, _) => Err(RegistryError::UnknownService(name.to_string())),
            }
        };

        self.ready.notify_all();
        result
    }
}

/// Resets an entry whose factory unwound instead of returning
struct AttemptGuard<'a> {
    registry: &'a ServiceRegistry,
    name: &'a ServiceName,
    attempt: u64,
    armed: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        {
            let mut inner = self.registry.inner.lock();
            let inner = &mut *inner;
            if let Some(entry) = inner.entries.get_mut(self.name) {
                let err = RegistryError::construction(self.name.clone(), "factory panicked".into());
                entry.transition(Slot::Registered);
                entry.last_failure = Some((self.attempt, err));
                inner.stats.construction_failures += 1;
            }
        }
        self.registry.ready.notify_all();
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("label", &self.label)
            .field("services", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn registry_new_empty() {
        let registry = ServiceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.label(), "default");
    }

    #[test]
    fn register_does_not_construct() {
        let registry = ServiceRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        registry
            .register("lazy", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.state("lazy"), ServiceState::Registered);
    }

    #[test]
    fn get_memoizes() {
        let registry = ServiceRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        registry
            .register("counter", move |_| Ok(counter.fetch_add(1, Ordering::SeqCst) + 1))
            .unwrap();

        let first = registry.get_as::<usize>("counter").unwrap();
        let second = registry.get_as::<usize>("counter").unwrap();

        assert_eq!(*first, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.state("counter"), ServiceState::Constructed);
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = ServiceRegistry::new();
        registry.register("flags", |_| Ok(1u8)).unwrap();

        let err = registry.register("flags", |_| Ok(2u8)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration(ref n) if n.as_str() == "flags"));

        // Still the first factory.
        assert_eq!(*registry.get_as::<u8>("flags").unwrap(), 1);
    }

    #[test]
    fn duplicate_after_construction_fails() {
        let registry = ServiceRegistry::new();
        registry.register("flags", |_| Ok(1u8)).unwrap();
        registry.get("flags").unwrap();

        assert!(matches!(
            registry.register("flags", |_| Ok(2u8)),
            Err(RegistryError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn unknown_service_fails() {
        let registry = ServiceRegistry::new();
        let err = registry.get("missing").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownService(ref n) if n.as_str() == "missing"));
        assert_eq!(registry.state("missing"), ServiceState::Unregistered);
    }

    #[test]
    fn empty_name_rejected() {
        let registry = ServiceRegistry::new();
        assert!(matches!(
            registry.register("", |_| Ok(())),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("   ", |_| Ok(())),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn blank_lookup_is_unknown() {
        let registry = ServiceRegistry::new();
        for name in ["", "   "] {
            let err = registry.get(name).unwrap_err();
            assert!(matches!(err, RegistryError::UnknownService(ref n) if n == name));
            assert!(matches!(
                registry.get_as::<u8>(name),
                Err(RegistryError::UnknownService(_))
            ));
        }
    }

    #[test]
    fn type_mismatch() {
        let registry = ServiceRegistry::new();
        registry.register("number", |_| Ok(7u32)).unwrap();

        let err = registry.get_as::<String>("number").unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { .. }));
    }

    #[test]
    fn failure_is_not_cached() {
        let registry = ServiceRegistry::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        registry
            .register("flaky", move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("first attempt fails".into())
                } else {
                    Ok(String::from("second"))
                }
            })
            .unwrap();

        let err = registry.get("flaky").unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(registry.state("flaky"), ServiceState::Registered);

        let value = registry.get_as::<String>("flaky").unwrap();
        assert_eq!(*value, "second");
        let again = registry.get_as::<String>("flaky").unwrap();
        assert!(Arc::ptr_eq(&value, &again));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn self_cycle_detected() {
        let registry = ServiceRegistry::new();
        registry
            .register("ouroboros", |r| {
                r.get("ouroboros")?;
                Ok(())
            })
            .unwrap();

        let err = registry.get("ouroboros").unwrap_err();
        assert!(err.is_cyclic());
        match err.root_cause() {
            RegistryError::CyclicDependency { path } => {
                let names: Vec<&str> = path.iter().map(ServiceName::as_str).collect();
                assert_eq!(names, ["ouroboros", "ouroboros"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.state("ouroboros"), ServiceState::Registered);
    }

    #[test]
    fn stats_track_lifecycle() {
        let registry = ServiceRegistry::new();
        registry.register("a", |_| Ok(1i32)).unwrap();
        registry.register("b", |_| Err::<i32, _>("nope".into())).unwrap();

        registry.get("a").unwrap();
        registry.get("a").unwrap();
        let _ = registry.get("b");

        let stats = registry.stats();
        assert_eq!(stats.registered, 2);
        assert_eq!(stats.constructed, 1);
        assert_eq!(stats.construction_attempts, 2);
        assert_eq!(stats.construction_failures, 1);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn names_in_registration_order() {
        let registry = ServiceRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(name, |_| Ok(())).unwrap();
        }

        let names: Vec<String> = registry.names().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn panicking_factory_resets_entry() {
        let registry = ServiceRegistry::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        registry
            .register("fragile", move |_| {
                assert!(counter.fetch_add(1, Ordering::SeqCst) > 0, "first attempt panics");
                Ok(5u8)
            })
            .unwrap();

        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = registry.get("fragile");
        }));
        assert!(panicked.is_err());
        assert_eq!(registry.state("fragile"), ServiceState::Registered);

        assert_eq!(*registry.get_as::<u8>("fragile").unwrap(), 5);
        assert_eq!(registry.stats().construction_failures, 1);
    }

    #[test]
    fn register_all_inserts_in_order() {
        let registry = ServiceRegistry::new();
        let mut batch = Registrations::new();
        batch.register("first", |_| Ok(1u8)).unwrap();
        batch.register("second", |r| Ok(*r.get_as::<u8>("first")? + 1)).unwrap();
        assert_eq!(batch.len(), 2);

        registry.register_all(batch).unwrap();
        assert_eq!(registry.state("first"), ServiceState::Registered);
        assert_eq!(*registry.get_as::<u8>("second").unwrap(), 2);
    }

    #[test]
    fn register_all_conflict_changes_nothing() {
        let registry = ServiceRegistry::new();
        registry.register("taken", |_| Ok(())).unwrap();

        let mut batch = Registrations::new();
        batch.register("fresh", |_| Ok(())).unwrap();
        batch.register("taken", |_| Ok(())).unwrap();

        let err = registry.register_all(batch).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration(ref n) if n.as_str() == "taken"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("fresh"));
    }

    #[test]
    fn batch_rejects_its_own_duplicates() {
        let mut batch = Registrations::new();
        batch.register("twice", |_| Ok(())).unwrap();
        assert!(matches!(
            batch.register("twice", |_| Ok(())),
            Err(RegistryError::DuplicateRegistration(_))
        ));
        assert!(matches!(
            batch.register("", |_| Ok(())),
            Err(RegistryError::InvalidName(_))
        ));
        assert_eq!(batch.names(), vec!["twice"]);
    }

    #[test]
    fn debug_lists_services() {
        let registry = ServiceRegistry::with_label("test");
        registry.register("one", |_| Ok(())).unwrap();
        let debug = format!("{registry:?}");
        assert!(debug.contains("test"));
        assert!(debug.contains("one"));
    }
}
