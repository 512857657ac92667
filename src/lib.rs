//! llama-bridge
//!
//! Native bridge between a managed host (Android over JNI, or any C caller)
//! and a llama.cpp inference library.
//!
//! The host never sees a pointer. It gets opaque 64-bit handles from a
//! [`HandleRegistry`] that owns each loaded context:
//!
//! - `init(path, n_ctx)` returns a handle, or `0` on failure
//! - `run(handle, prompt, max_tokens)` returns text, or `"Invalid handle"`
//! - `release(handle)` is idempotent
//!
//! Handles count up from 1 and are never reused, so a stale handle can
//! never reach a newer context.
//!
//! # Backends
//!
//! - default: simulated contexts that echo the prompt
//! - `gguf`: llama-cpp-2
//!
//! # Entry points
//!
//! - [`LlamaBridge`] for Rust callers
//! - [`ffi`] C ABI over an explicit runtime pointer
//! - `jni_bridge` (feature `jni`) for `LlamaNativeBridge` on Android

pub mod backend;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod ffi;
#[cfg(feature = "jni")]
pub mod jni_bridge;
pub mod preflight;
pub mod registry;
pub mod telemetry;

pub use backend::{LoadRequest, ModelBackend, ModelResource, SimulatedBackend};
pub use bridge::{InitOutcome, LlamaBridge};
pub use config::BridgeConfig;
pub use error::{BridgeError, INVALID_HANDLE_MESSAGE};
pub use registry::{Handle, HandleRegistry, HandleState};
