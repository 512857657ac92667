// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime lifecycle for C callers.

use std::ffi::c_int;

use super::error::set_last_error;
use crate::bridge::LlamaBridge;
use crate::config;
use crate::telemetry::{init_logging, LogError};

/// Opaque runtime handed to C callers. Owns one [`LlamaBridge`].
pub struct BridgeRuntime {
    pub(crate) bridge: LlamaBridge,
}

impl BridgeRuntime {
    pub fn new(bridge: LlamaBridge) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &LlamaBridge {
        &self.bridge
    }
}

/// Create a runtime from `LLAMA_BRIDGE_*` configuration.
///
/// Free with `llama_bridge_runtime_destroy`.
#[no_mangle]
pub extern "C" fn llama_bridge_runtime_create() -> *mut BridgeRuntime {
    let bridge = LlamaBridge::from_config(config::load());
    tracing::debug!(backend = bridge.backend_name(), "runtime created");
    Box::into_raw(Box::new(BridgeRuntime::new(bridge)))
}

/// Destroy a runtime, releasing every handle still open on it.
///
/// # Safety
///
/// `runtime` must come from `llama_bridge_runtime_create` and must not be
/// used afterwards. NULL is ignored.
#[no_mangle]
pub unsafe extern "C" fn llama_bridge_runtime_destroy(runtime: *mut BridgeRuntime) {
    if !runtime.is_null() {
        drop(Box::from_raw(runtime));
    }
}

/// Install the tracing subscriber from `LLAMA_BRIDGE_LOG_*` settings.
///
/// Returns 0 on success or if a subscriber is already installed, -1 otherwise.
#[no_mangle]
pub extern "C" fn llama_bridge_init_logging() -> c_int {
    match init_logging(&config::load().log) {
        Ok(()) | Err(LogError::AlreadyInitialized) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}
