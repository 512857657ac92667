// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model CLI subcommands: infer, preflight, checksum.

use std::path::Path;

use crate::bridge::LlamaBridge;
use crate::config;
use crate::error::BridgeError;
use crate::preflight::{self, ModelPreflight};

/// One-shot generation: open the model, generate, close.
pub fn run_infer(model: &str, prompt: &str, max_tokens: i32) -> i32 {
    let bridge = LlamaBridge::from_config(config::load());
    match bridge.respond(model, prompt, max_tokens) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Inference failed: {}", e);
            1
        }
    }
}

/// Run preflight checks and report size and warnings.
pub fn run_preflight(model: &str) -> i32 {
    let cfg = config::load();
    match ModelPreflight::new(cfg.min_model_bytes).check(Path::new(model)) {
        Ok(info) => {
            println!("path: {}", info.path.display());
            println!("size_bytes: {}", info.size_bytes);
            if info.suspiciously_small {
                println!(
                    "warning: smaller than {} bytes; is this really a model?",
                    cfg.min_model_bytes
                );
            }
            0
        }
        Err(e) => {
            eprintln!("Preflight failed: {}", e);
            1
        }
    }
}

/// Print the SHA-256 of a model, or verify it against `expected`.
pub fn run_checksum(model: &str, expected: Option<&str>) -> i32 {
    let path = Path::new(model);
    match expected {
        None => match preflight::sha256_file(path) {
            Ok(hash) => {
                println!("{}  {}", hash, model);
                0
            }
            Err(e) => {
                eprintln!("Checksum failed: {}", e);
                1
            }
        },
        Some(expected) => match preflight::verify_checksum(path, expected) {
            Ok(()) => {
                println!("{}: OK", model);
                0
            }
            Err(BridgeError::ChecksumMismatch { actual, .. }) => {
                eprintln!("{}: FAILED (got {})", model, actual);
                1
            }
            Err(e) => {
                eprintln!("Checksum failed: {}", e);
                1
            }
        },
    }
}
