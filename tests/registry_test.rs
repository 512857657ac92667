//! Handle registry tests: monotonic handles, invalid lookups, idempotent
//! close, and concurrent create/use/close.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use llama_bridge::{BridgeError, Handle, HandleRegistry, HandleState};

struct Tracked {
    label: String,
    releases: Arc<AtomicUsize>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn tracked(label: &str, releases: &Arc<AtomicUsize>) -> Tracked {
    Tracked {
        label: label.to_string(),
        releases: releases.clone(),
    }
}

// ============================================================================
// Handle issuance
// ============================================================================

#[test]
fn test_handles_strictly_increasing() {
    let registry = HandleRegistry::new();
    let mut last = 0;
    for i in 0..50 {
        let handle = registry.insert(i);
        assert!(handle.id() > last);
        last = handle.id();
    }
    assert_eq!(registry.issued(), 50);
}

#[test]
fn test_handles_not_reused_after_close() {
    let registry = HandleRegistry::new();
    let first = registry.insert("a");
    registry.close(first);
    let second = registry.insert("b");
    assert_ne!(first, second);
    assert_eq!(second.id(), first.id() + 1);
}

#[test]
fn test_failed_create_leaves_registry_unchanged() {
    let registry: HandleRegistry<String> = HandleRegistry::new();
    let ok = registry.create(|| Ok::<_, BridgeError>("ctx".to_string())).unwrap();
    let err = registry.create(|| Err::<String, _>(BridgeError::AcquisitionFailure("oom".into())));

    assert!(matches!(err, Err(BridgeError::AcquisitionFailure(_))));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.handles(), vec![ok]);
}

// ============================================================================
// Use
// ============================================================================

#[test]
fn test_use_unknown_handle_is_invalid() {
    let registry: HandleRegistry<u8> = HandleRegistry::new();
    registry.insert(1);

    for id in [0u64, 2, 99, u64::MAX] {
        let result = registry.with(Handle::new(id), |v| *v);
        assert!(matches!(result, Err(BridgeError::InvalidHandle(got)) if got == id));
    }
}

#[test]
fn test_use_after_close_is_invalid() {
    let registry = HandleRegistry::new();
    let handle = registry.insert(String::from("context"));
    assert_eq!(registry.with(handle, |s| s.len()).unwrap(), 7);

    registry.close(handle);
    assert!(matches!(
        registry.with(handle, |s| s.len()),
        Err(BridgeError::InvalidHandle(_))
    ));
    assert_eq!(registry.state(handle), HandleState::Closed);
}

#[test]
fn test_use_does_not_change_membership() {
    let registry = HandleRegistry::new();
    let a = registry.insert(1u32);
    let b = registry.insert(2u32);
    let sum = registry.with(a, |x| *x).unwrap() + registry.with(b, |x| *x).unwrap();
    assert_eq!(sum, 3);
    assert_eq!(registry.handles(), vec![a, b]);
}

// ============================================================================
// Close
// ============================================================================

#[test]
fn test_close_is_idempotent() {
    let releases = Arc::new(AtomicUsize::new(0));
    let registry = HandleRegistry::new();
    let handle = registry.insert(tracked("ctx", &releases));

    assert!(registry.close(handle));
    let after_first = (registry.len(), registry.state(handle), releases.load(Ordering::SeqCst));
    assert!(!registry.close(handle));
    let after_second = (registry.len(), registry.state(handle), releases.load(Ordering::SeqCst));

    assert_eq!(after_first, after_second);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_unknown_handle_is_noop() {
    let registry: HandleRegistry<u8> = HandleRegistry::new();
    assert!(!registry.close(Handle::new(5)));
    assert!(!registry.close(Handle::INVALID));
    assert!(registry.is_empty());
}

#[test]
fn test_dropping_registry_releases_remaining() {
    let releases = Arc::new(AtomicUsize::new(0));
    {
        let registry = HandleRegistry::new();
        registry.insert(tracked("a", &releases));
        let b = registry.insert(tracked("b", &releases));
        registry.close(b);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
    assert_eq!(releases.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_create_yields_distinct_handles() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 100;

    let registry = Arc::new(HandleRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| registry.insert(t * PER_THREAD + i))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for worker in workers {
        let handles = worker.join().unwrap();
        // Per-thread order is still strictly increasing.
        assert!(handles.windows(2).all(|w| w[0] < w[1]));
        for handle in handles {
            assert!(seen.insert(handle), "duplicate handle {handle}");
        }
    }

    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert_eq!(registry.len(), THREADS * PER_THREAD);
    assert_eq!(registry.issued(), (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_concurrent_close_releases_exactly_once() {
    const THREADS: usize = 8;

    let releases = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(HandleRegistry::new());
    let handles: Vec<Handle> = (0..32)
        .map(|i| registry.insert(tracked(&format!("ctx-{i}"), &releases)))
        .collect();
    let handles = Arc::new(handles);
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let handles = handles.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                handles.iter().filter(|h| registry.close(**h)).count()
            })
        })
        .collect();

    let closed: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(closed, 32);
    assert_eq!(releases.load(Ordering::SeqCst), 32);
    assert!(registry.is_empty());
}

#[test]
fn test_use_racing_close_never_sees_released_resource() {
    let releases = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(HandleRegistry::new());
    let handle = registry.insert(tracked("shared", &releases));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            let releases = releases.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    match registry.with(handle, |t| {
                        // While a use holds the resource it cannot have been released.
                        assert_eq!(releases.load(Ordering::SeqCst), 0);
                        t.label.len()
                    }) {
                        Ok(len) => assert_eq!(len, 6),
                        Err(BridgeError::InvalidHandle(_)) => break,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();

    registry.close(handle);
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}
