// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

// ============================================================================
// JNI exports for on-device inference
// ============================================================================
//
// Java side:
//
//   package com.aktarjabed.nextgenzip.ai;
//   public class LlamaNativeBridge {
//       public static native long nativeInit(String modelPath, int contextSize);
//       public static native String nativeInfer(long handle, String prompt, int maxTokens);
//       public static native void nativeClose(long handle);
//   }
//
// JNI symbols carry no context pointer, so this module holds the one
// process-wide bridge. Everything below it takes the bridge explicitly.
// ============================================================================

use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::OnceLock;

use jni::objects::{JClass, JString};
use jni::sys::{jint, jlong, jstring, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};

use crate::bridge::LlamaBridge;
use crate::config;
use crate::error::BridgeError;
use crate::telemetry::init_logging;

static BRIDGE: OnceLock<LlamaBridge> = OnceLock::new();

/// Inject the bridge used by the JNI exports. Must run before the first
/// native call; returns the bridge back if one is already installed.
pub fn install(bridge: LlamaBridge) -> Result<(), LlamaBridge> {
    BRIDGE.set(bridge)
}

/// The installed bridge, created from env configuration on first use.
pub fn bridge() -> &'static LlamaBridge {
    BRIDGE.get_or_init(|| LlamaBridge::from_config(config::load()))
}

fn read_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    match env.get_string(value) {
        Ok(s) => Some(s.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read Java string");
            None
        }
    }
}

/// Called by the VM when the library is loaded.
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    // The host may already have a subscriber; that is fine.
    let _ = init_logging(&config::load().log);
    JNI_VERSION_1_6
}

/// Java signature:
/// public static native long nativeInit(String modelPath, int contextSize);
///
/// Returns: handle, or 0 on failure
#[no_mangle]
pub extern "system" fn Java_com_aktarjabed_nextgenzip_ai_LlamaNativeBridge_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    model_path: JString<'local>,
    context_size: jint,
) -> jlong {
    let Some(path) = read_string(&mut env, &model_path) else {
        return 0;
    };
    catch_unwind(AssertUnwindSafe(|| bridge().init(&path, context_size))).unwrap_or(0)
}

/// Java signature:
/// public static native String nativeInfer(long handle, String prompt, int maxTokens);
///
/// Returns: generated text, "Invalid handle" for an unknown handle, or null
/// if the prompt could not be read
#[no_mangle]
pub extern "system" fn Java_com_aktarjabed_nextgenzip_ai_LlamaNativeBridge_nativeInfer<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    prompt: JString<'local>,
    max_tokens: jint,
) -> jstring {
    let Some(prompt) = read_string(&mut env, &prompt) else {
        return ptr::null_mut();
    };

    let output = catch_unwind(AssertUnwindSafe(|| bridge().run(handle, &prompt, max_tokens)))
        .unwrap_or_else(|_| {
            tracing::error!(handle, "panic during inference");
            BridgeError::Inference("native panic".into()).boundary_message()
        });

    match env.new_string(output) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Java signature:
/// public static native void nativeClose(long handle);
#[no_mangle]
pub extern "system" fn Java_com_aktarjabed_nextgenzip_ai_LlamaNativeBridge_nativeClose<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) {
    if catch_unwind(AssertUnwindSafe(|| bridge().release(handle))).is_err() {
        tracing::error!(handle, "panic during release");
    }
}
