// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.

use crate::config::{self, EffectiveConfig, DEFAULT_MAX_TOKENS, DEFAULT_MIN_MODEL_BYTES, DEFAULT_N_CTX};
use crate::telemetry::init_logging;

/// Print effective config to stdout, as key-value pairs or JSON.
pub fn run_show(json: bool) -> i32 {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize config: {}", e);
                return 1;
            }
        }
    } else {
        print_config(&cfg);
    }
    0
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    println!("LLAMA_BRIDGE_N_CTX={}", DEFAULT_N_CTX);
    println!("LLAMA_BRIDGE_MAX_TOKENS={}", DEFAULT_MAX_TOKENS);
    println!("LLAMA_BRIDGE_MIN_MODEL_BYTES={}", DEFAULT_MIN_MODEL_BYTES);
    println!("LLAMA_BRIDGE_N_THREADS=0");
    println!("LLAMA_BRIDGE_N_GPU_LAYERS=0");
    println!("LLAMA_BRIDGE_LOG_LEVEL=info");
    println!("LLAMA_BRIDGE_LOG_FORMAT=json");
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let env = config::load();
    let mut warnings = 0;

    if let Some(path) = &env.config_file {
        if let Err(e) = config::read_file_config(path) {
            eprintln!("WARNING: {}", e);
            warnings += 1;
        }
    }

    if env.max_tokens >= env.n_ctx {
        eprintln!(
            "WARNING: LLAMA_BRIDGE_MAX_TOKENS ({}) >= LLAMA_BRIDGE_N_CTX ({}); prompts will be truncated",
            env.max_tokens, env.n_ctx
        );
        warnings += 1;
    }

    if let Err(e) = tracing_subscriber::EnvFilter::try_new(&env.log.level) {
        eprintln!("WARNING: LLAMA_BRIDGE_LOG_LEVEL is not a valid filter: {}", e);
        warnings += 1;
    }

    if warnings == 0 {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Initialize logging for CLI commands; failures only print a warning.
pub fn init_cli_logging() {
    if let Err(e) = init_logging(&config::load().log) {
        eprintln!("WARNING: logging disabled: {}", e);
    }
}

fn print_config(cfg: &EffectiveConfig) {
    println!("LLAMA_BRIDGE_N_CTX={}", cfg.n_ctx);
    println!("LLAMA_BRIDGE_MAX_TOKENS={}", cfg.max_tokens);
    println!("LLAMA_BRIDGE_MIN_MODEL_BYTES={}", cfg.min_model_bytes);
    println!("LLAMA_BRIDGE_N_THREADS={} (effective {})", cfg.n_threads, cfg.effective_threads);
    println!("LLAMA_BRIDGE_N_GPU_LAYERS={}", cfg.n_gpu_layers);
    println!("LLAMA_BRIDGE_LOG_LEVEL={}", cfg.log_level);
    println!("LLAMA_BRIDGE_LOG_FORMAT={}", cfg.log_format);
    if let Some(file) = &cfg.log_file {
        println!("LLAMA_BRIDGE_LOG_FILE={}", file);
    }
    if let Some(file) = &cfg.config_file {
        println!("LLAMA_BRIDGE_CONFIG={}", file);
    }
}
