// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! init / run / release for C callers.

use std::ffi::{c_char, c_int, CStr, CString};
use std::ptr;

use super::error::set_last_error;
use super::runtime::BridgeRuntime;
use crate::error::BridgeError;
use crate::registry::Handle;

/// Acquire a model context. Returns its handle, or 0 on failure.
///
/// # Safety
///
/// `runtime` must be a live runtime; `model_path` a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn llama_bridge_init(
    runtime: *mut BridgeRuntime,
    model_path: *const c_char,
    context_size: c_int,
) -> i64 {
    if runtime.is_null() || model_path.is_null() {
        set_last_error("null pointer argument");
        return 0;
    }

    let rt = &*runtime;
    let path_str = match CStr::from_ptr(model_path).to_str() {
        Ok(s) => s,
        Err(_) => {
            set_last_error("invalid UTF-8 in model_path");
            return 0;
        }
    };

    let handle = rt.bridge.init(path_str, context_size);
    if handle == 0 {
        set_last_error(format!("acquisition failed for {}", path_str));
    }
    handle
}

/// Generate from a live handle.
///
/// Returns an owned string (free with `llama_bridge_string_free`). An unknown
/// handle yields `"Invalid handle"`; NULL is returned only for bad arguments.
///
/// # Safety
///
/// `runtime` must be a live runtime; `input` a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn llama_bridge_run(
    runtime: *mut BridgeRuntime,
    handle: i64,
    input: *const c_char,
    max_tokens: c_int,
) -> *mut c_char {
    if runtime.is_null() || input.is_null() {
        set_last_error("null pointer argument");
        return ptr::null_mut();
    }

    let rt = &*runtime;
    let input_str = match CStr::from_ptr(input).to_str() {
        Ok(s) => s,
        Err(_) => {
            set_last_error("invalid UTF-8 in input");
            return ptr::null_mut();
        }
    };

    let max_tokens = rt.bridge.config().max_tokens_or_default(max_tokens);
    let output = match rt.bridge.infer(Handle::from_raw(handle), input_str, max_tokens) {
        Ok(text) => text,
        Err(e) => {
            set_last_error(e.to_string());
            e.boundary_message()
        }
    };

    match CString::new(output) {
        Ok(s) => s.into_raw(),
        Err(_) => {
            set_last_error(BridgeError::Inference("output contains NUL byte".into()).to_string());
            ptr::null_mut()
        }
    }
}

/// Release a handle. Unknown handles are ignored.
///
/// # Safety
///
/// `runtime` must be a live runtime or NULL.
#[no_mangle]
pub unsafe extern "C" fn llama_bridge_release(runtime: *mut BridgeRuntime, handle: i64) {
    if runtime.is_null() {
        set_last_error("null pointer argument");
        return;
    }
    (*runtime).bridge.release(handle);
}

/// Free a string returned by `llama_bridge_run`.
///
/// # Safety
///
/// `s` must come from `llama_bridge_run` and be freed only once. NULL is ignored.
#[no_mangle]
pub unsafe extern "C" fn llama_bridge_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
