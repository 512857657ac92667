// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bridge configuration loading.
//!
//! Values come from an optional TOML file named by `LLAMA_BRIDGE_CONFIG`,
//! then `LLAMA_BRIDGE_*` environment variables override them. Invalid values
//! fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `LLAMA_BRIDGE_N_CTX` | 2048 | Default context size (tokens) |
//! | `LLAMA_BRIDGE_MAX_TOKENS` | 128 | Default generation limit |
//! | `LLAMA_BRIDGE_MIN_MODEL_BYTES` | 1024 | Preflight small-file warning threshold |
//! | `LLAMA_BRIDGE_N_THREADS` | 0 | Inference threads (0 = auto) |
//! | `LLAMA_BRIDGE_N_GPU_LAYERS` | 0 | Layers offloaded by the gguf backend |
//! | `LLAMA_BRIDGE_LOG_LEVEL` | info | tracing filter |
//! | `LLAMA_BRIDGE_LOG_FORMAT` | json | `json` or `pretty` |
//! | `LLAMA_BRIDGE_LOG_FILE` | unset | Log file path (stderr if unset) |
//! | `LLAMA_BRIDGE_CONFIG` | unset | TOML file read before env overrides |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_N_CTX: u32 = 2048;
pub const DEFAULT_MAX_TOKENS: u32 = 128;
pub const DEFAULT_MIN_MODEL_BYTES: u64 = 1024;

const MIN_N_CTX: u32 = 128;
const MAX_AUTO_THREADS: usize = 16;
const CONFIG_FILE_VAR: &str = "LLAMA_BRIDGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(String),
}

/// Bridge configuration after file and env layering.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub n_ctx: u32,
    pub max_tokens: u32,
    pub min_model_bytes: u64,
    pub n_threads: u32,
    pub n_gpu_layers: u32,
    pub log: LogConfig,
    pub config_file: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            n_ctx: DEFAULT_N_CTX,
            max_tokens: DEFAULT_MAX_TOKENS,
            min_model_bytes: DEFAULT_MIN_MODEL_BYTES,
            n_threads: 0,
            n_gpu_layers: 0,
            log: LogConfig::default(),
            config_file: None,
        }
    }
}

/// Contents of a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub n_ctx: Option<u32>,
    pub max_tokens: Option<u32>,
    pub min_model_bytes: Option<u64>,
    pub n_threads: Option<u32>,
    pub n_gpu_layers: Option<u32>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub n_ctx: u32,
    pub max_tokens: u32,
    pub min_model_bytes: u64,
    pub n_threads: u32,
    pub effective_threads: i32,
    pub n_gpu_layers: u32,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<String>,
    pub config_file: Option<String>,
}

/// Parse a TOML config document.
pub fn parse_file_config(text: &str) -> Result<FileConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Read and parse a TOML config file.
pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file_config(&text)
}

fn parse_num<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> T {
    match lookup(key) {
        Some(val) => val.trim().parse::<T>().unwrap_or(fallback),
        None => fallback,
    }
}

fn parse_format(value: &str) -> LogFormat {
    match value.trim().to_ascii_lowercase().as_str() {
        "pretty" => LogFormat::Pretty,
        _ => LogFormat::Json,
    }
}

/// Load configuration from the process environment.
pub fn load() -> BridgeConfig {
    load_from(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary key lookup.
///
/// A config file that cannot be read or parsed is logged and ignored.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> BridgeConfig {
    let config_file = lookup(CONFIG_FILE_VAR).map(PathBuf::from);
    let file = match &config_file {
        Some(path) => read_file_config(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring config file");
            FileConfig::default()
        }),
        None => FileConfig::default(),
    };
    let mut config = apply_file(BridgeConfig::default(), file);
    config.config_file = config_file;
    apply_env(config, &lookup)
}

fn apply_file(mut config: BridgeConfig, file: FileConfig) -> BridgeConfig {
    if let Some(v) = file.n_ctx {
        config.n_ctx = v;
    }
    if let Some(v) = file.max_tokens {
        config.max_tokens = v;
    }
    if let Some(v) = file.min_model_bytes {
        config.min_model_bytes = v;
    }
    if let Some(v) = file.n_threads {
        config.n_threads = v;
    }
    if let Some(v) = file.n_gpu_layers {
        config.n_gpu_layers = v;
    }
    if let Some(v) = file.log_level {
        config.log.level = v;
    }
    if let Some(v) = file.log_format {
        config.log.format = parse_format(&v);
    }
    if file.log_file.is_some() {
        config.log.output_path = file.log_file;
    }
    config
}

fn apply_env(config: BridgeConfig, lookup: &impl Fn(&str) -> Option<String>) -> BridgeConfig {
    let n_ctx = parse_num(lookup, "LLAMA_BRIDGE_N_CTX", config.n_ctx);
    let max_tokens = parse_num(lookup, "LLAMA_BRIDGE_MAX_TOKENS", config.max_tokens);
    let min_model_bytes = parse_num(lookup, "LLAMA_BRIDGE_MIN_MODEL_BYTES", config.min_model_bytes);
    let n_threads = parse_num(lookup, "LLAMA_BRIDGE_N_THREADS", config.n_threads);
    let n_gpu_layers = parse_num(lookup, "LLAMA_BRIDGE_N_GPU_LAYERS", config.n_gpu_layers);

    let mut log = config.log;
    if let Some(level) = lookup("LLAMA_BRIDGE_LOG_LEVEL") {
        log.level = level;
    }
    if let Some(format) = lookup("LLAMA_BRIDGE_LOG_FORMAT") {
        log.format = parse_format(&format);
    }
    if let Some(path) = lookup("LLAMA_BRIDGE_LOG_FILE") {
        log.output_path = Some(PathBuf::from(path));
    }

    BridgeConfig {
        n_ctx: n_ctx.max(MIN_N_CTX), // floor: 128 tokens minimum
        max_tokens: max_tokens.max(1),
        min_model_bytes,
        n_threads,
        n_gpu_layers,
        log,
        config_file: config.config_file,
    }
}

/// Resolve the thread count handed to the inference library.
pub fn resolve_threads(n: u32) -> i32 {
    if n == 0 {
        // Cap at 16 to avoid diminishing returns on high-core systems
        let optimal = num_cpus::get().clamp(1, MAX_AUTO_THREADS);
        i32::try_from(optimal).unwrap_or(4)
    } else {
        i32::try_from(n).unwrap_or(4)
    }
}

impl BridgeConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            n_ctx: self.n_ctx,
            max_tokens: self.max_tokens,
            min_model_bytes: self.min_model_bytes,
            n_threads: self.n_threads,
            effective_threads: resolve_threads(self.n_threads),
            n_gpu_layers: self.n_gpu_layers,
            log_level: self.log.level.clone(),
            log_format: match self.log.format {
                LogFormat::Json => "json".to_string(),
                LogFormat::Pretty => "pretty".to_string(),
            },
            log_file: self.log.output_path.as_ref().map(|p| p.display().to_string()),
            config_file: self.config_file.as_ref().map(|p| p.display().to_string()),
        }
    }

    /// Context size for a host-supplied value; non-positive means default.
    pub fn context_size_or_default(&self, requested: i32) -> u32 {
        u32::try_from(requested)
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(self.n_ctx)
    }

    /// Generation limit for a host-supplied value; non-positive means default.
    pub fn max_tokens_or_default(&self, requested: i32) -> u32 {
        u32::try_from(requested)
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(self.max_tokens)
    }
}
