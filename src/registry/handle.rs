//! Opaque handles issued by the registry.

use std::fmt;

/// Unique handle to a registered native resource.
///
/// Handles start at 1 and are never reused; `0` is the invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Sentinel returned to the host when acquisition fails.
    pub const INVALID: Handle = Handle(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Convert a host-side `long`. Negative values map to [`Handle::INVALID`].
    pub fn from_raw(raw: i64) -> Self {
        u64::try_from(raw).map(Self).unwrap_or(Self::INVALID)
    }

    /// Host-side `long` representation.
    pub fn as_raw(&self) -> i64 {
        // ids past i64::MAX would need 2^63 creates; saturate rather than wrap negative
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Never issued by this registry.
    Uninitialized,
    /// Issued and holding a live resource.
    Active,
    /// Issued, then closed. Terminal.
    Closed,
}
