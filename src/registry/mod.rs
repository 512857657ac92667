//! Handle registry for native resources.
//!
//! Maps monotonically increasing [`Handle`]s to owned resources behind a
//! single `parking_lot::Mutex`. The lock covers map operations only:
//! acquisition runs before it is taken, and both use and release run on an
//! `Arc` after it is dropped, so a slow generation never blocks unrelated
//! create/close calls.

mod handle;

pub use handle::{Handle, HandleState};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::BridgeError;

/// Thread-safe registry of native resources keyed by handle.
pub struct HandleRegistry<R> {
    entries: Mutex<HashMap<Handle, Arc<R>>>,
    next_id: AtomicU64,
}

impl<R> HandleRegistry<R> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Acquire a resource and register it under a fresh handle.
    ///
    /// If `acquire` fails the registry is left untouched and no handle is
    /// consumed.
    pub fn create<E>(&self, acquire: impl FnOnce() -> Result<R, E>) -> Result<Handle, E> {
        let resource = Arc::new(acquire()?);
        Ok(self.insert_arc(resource))
    }

    /// Register an already-acquired resource.
    pub fn insert(&self, resource: R) -> Handle {
        self.insert_arc(Arc::new(resource))
    }

    fn insert_arc(&self, resource: Arc<R>) -> Handle {
        let mut entries = self.entries.lock();
        // Drawn under the lock so handle order matches insertion order.
        let handle = Handle::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        entries.insert(handle, resource);
        drop(entries);
        tracing::trace!(handle = handle.id(), "registered resource");
        handle
    }

    /// Shared reference to a live resource.
    pub fn get(&self, handle: Handle) -> Result<Arc<R>, BridgeError> {
        self.entries
            .lock()
            .get(&handle)
            .cloned()
            .ok_or(BridgeError::InvalidHandle(handle.id()))
    }

    /// Run a read-only operation against a live resource.
    ///
    /// The registry lock is released before `f` runs.
    pub fn with<T>(&self, handle: Handle, f: impl FnOnce(&R) -> T) -> Result<T, BridgeError> {
        let resource = self.get(handle)?;
        Ok(f(&resource))
    }

    /// Remove a handle and release its resource. Returns false if the
    /// handle was not registered (closing twice is a no-op).
    ///
    /// The release happens outside the lock; if a `with` call is still
    /// running on this handle, the resource is dropped when it finishes.
    pub fn close(&self, handle: Handle) -> bool {
        let removed = self.entries.lock().remove(&handle);
        match removed {
            Some(resource) => {
                drop(resource);
                tracing::trace!(handle = handle.id(), "released resource");
                true
            }
            None => false,
        }
    }

    /// Close every registered handle. Returns the number released.
    pub fn close_all(&self) -> usize {
        let drained: Vec<Arc<R>> = self.entries.lock().drain().map(|(_, r)| r).collect();
        let count = drained.len();
        drop(drained);
        count
    }

    /// Check if a handle is currently registered.
    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.lock().contains_key(&handle)
    }

    /// Lifecycle state of a handle.
    pub fn state(&self, handle: Handle) -> HandleState {
        let entries = self.entries.lock();
        if entries.contains_key(&handle) {
            return HandleState::Active;
        }
        let next = self.next_id.load(Ordering::SeqCst);
        if handle.is_valid() && handle.id() < next {
            HandleState::Closed
        } else {
            HandleState::Uninitialized
        }
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Sorted snapshot of live handles.
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.entries.lock().keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Total handles issued so far, including closed ones.
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst) - 1
    }
}

impl<R> Default for HandleRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
