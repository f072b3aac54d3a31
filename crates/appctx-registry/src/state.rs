//! Per-service lifecycle
//!
//! Every name moves through `Unregistered → Registered → Constructing →
//! Constructed`. A failed construction drops back to `Registered` so the next
//! lookup retries; there is no permanent failed state.

use std::fmt::{self, Display, Formatter};

/// Lifecycle state of one service name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// No registration under this name
    Unregistered,
    /// Factory stored, never successfully run
    Registered,
    /// Factory currently running
    Constructing,
    /// Instance cached
    Constructed,
}

impl ServiceState {
    /// All states, in lifecycle order
    pub const ALL: [ServiceState; 4] = [
        ServiceState::Unregistered,
        ServiceState::Registered,
        ServiceState::Constructing,
        ServiceState::Constructed,
    ];

    /// States reachable in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [ServiceState] {
        use ServiceState::{Constructed, Constructing, Registered, Unregistered};
        match self {
            Unregistered => &[Registered],
            Registered => &[Constructing],
            Constructing => &[Constructed, Registered],
            Constructed => &[],
        }
    }

    /// Check if `self → to` is a legal step
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, to: ServiceState) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Check if an instance is cached
    #[inline]
    #[must_use]
    pub fn is_constructed(self) -> bool {
        matches!(self, Self::Constructed)
    }

    /// Lowercase label used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Constructing => "constructing",
            Self::Constructed => "constructed",
        }
    }
}

impl Display for ServiceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
