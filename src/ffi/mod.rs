// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! C ABI over an explicit runtime pointer.
//!
//! Every failure is reported as a sentinel (handle `0`, NULL, or the
//! `"Invalid handle"` string) plus a thread-local message readable through
//! `llama_bridge_last_error`.

mod error;
mod handles;
mod runtime;

pub use error::{llama_bridge_clear_last_error, llama_bridge_last_error};
pub use handles::{llama_bridge_init, llama_bridge_release, llama_bridge_run, llama_bridge_string_free};
pub use runtime::{
    llama_bridge_init_logging, llama_bridge_runtime_create, llama_bridge_runtime_destroy,
    BridgeRuntime,
};
