// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Thread-local last-error message for C callers.

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(msg: impl Into<String>) {
    let msg = msg.into().replace('\0', " ");
    let cstr = CString::new(msg).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(cstr));
}

/// Last error message on this thread, or NULL if none.
///
/// The pointer stays valid until the next bridge call on the same thread
/// sets or clears the error.
#[no_mangle]
pub extern "C" fn llama_bridge_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Clear the last error message on this thread.
#[no_mangle]
pub extern "C" fn llama_bridge_clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
