//! Construction cycle detection
//!
//! Two sources of cycles are tracked:
//! - Re-entrant lookups on one thread, via a thread-local stack of the
//!   services that thread is currently constructing.
//! - Lookups that would block on another thread, via the wait-for chain
//!   `thread → awaited service → constructing thread → ...`.

use crate::name::ServiceName;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::ThreadId;

/// Distinguishes registries sharing a thread-local stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RegistryId(u64);

impl RegistryId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

thread_local! {
    static CONSTRUCTING: RefCell<Vec<(RegistryId, ServiceName)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a service as under construction on the current thread
///
/// Popped on drop, including during unwinding.
#[derive(Debug)]
pub(crate) struct Frame {
    _private: (),
}

impl Frame {
    pub(crate) fn enter(registry: RegistryId, name: ServiceName) -> Self {
        CONSTRUCTING.with(|stack| stack.borrow_mut().push((registry, name)));
        Self { _private: () }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        CONSTRUCTING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Cycle path for a re-entrant lookup of `name` on this thread
///
/// Starts at the outermost frame constructing `name` and ends with `name`
/// again, e.g. `[a, b, a]`.
pub(crate) fn reentrant_path(registry: RegistryId, name: &ServiceName) -> Vec<ServiceName> {
    CONSTRUCTING.with(|stack| {
        let stack = stack.borrow();
        let mut path: Vec<ServiceName> = stack
            .iter()
            .filter(|(id, _)| *id == registry)
            .map(|(_, frame)| frame.clone())
            .skip_while(|frame| frame != name)
            .collect();
        path.push(name.clone());
        path
    })
}

/// Cycle path if waiting for `target` would deadlock `me`
///
/// `owner_of` reports which thread is constructing a service, `waiting`
/// which service each blocked thread is waiting for. The chain is followed
/// from `target`; reaching a service `me` is constructing closes the cycle.
pub(crate) fn wait_path(
    me: ThreadId,
    target: &ServiceName,
    waiting: &HashMap<ThreadId, ServiceName>,
    owner_of: impl Fn(&ServiceName) -> Option<ThreadId>,
) -> Option<Vec<ServiceName>> {
    let mut path = vec![target.clone()];
    let mut current = target.clone();

    // Each hop consumes one waiting thread, so the chain is bounded.
    for _ in 0..=waiting.len() {
        let owner = owner_of(&current)?;
        if owner == me {
            // `current` is ours and we are about to wait for `target`.
            path.insert(0, current);
            return Some(path);
        }
        current = waiting.get(&owner)?.clone();
        path.push(current.clone());
    }
    None
}
