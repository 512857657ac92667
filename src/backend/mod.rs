//! Inference backends behind the handle registry.
//!
//! The registry never looks inside a resource; everything model-specific
//! lives behind these two traits.

mod simulated;

#[cfg(feature = "gguf")]
mod gguf;

pub use simulated::{SimulatedBackend, SimulatedContext, SIMULATED_RESPONSE_PREFIX};

#[cfg(feature = "gguf")]
pub use gguf::{GgufBackend, GgufContext};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::error::BridgeError;

/// Arguments for acquiring a native resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub model_path: PathBuf,
    pub n_ctx: u32,
}

impl LoadRequest {
    pub fn new(model_path: impl Into<PathBuf>, n_ctx: u32) -> Self {
        Self { model_path: model_path.into(), n_ctx }
    }
}

/// A loaded model/context owned by exactly one registry entry.
///
/// Release happens in `Drop`.
pub trait ModelResource: Send + Sync {
    /// Generate a completion for `prompt`, producing at most `max_tokens`.
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, BridgeError>;

    /// Short description for logs and CLI output.
    fn describe(&self) -> String;
}

/// Acquires native resources from an inference library.
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn load(&self, request: &LoadRequest) -> Result<Box<dyn ModelResource>, BridgeError>;
}

/// Backend selected by build features: llama-cpp-2 with `gguf`, simulated otherwise.
#[cfg(feature = "gguf")]
pub fn default_backend(config: &BridgeConfig) -> Arc<dyn ModelBackend> {
    Arc::new(GgufBackend::new(config))
}

/// Backend selected by build features: llama-cpp-2 with `gguf`, simulated otherwise.
#[cfg(not(feature = "gguf"))]
pub fn default_backend(_config: &BridgeConfig) -> Arc<dyn ModelBackend> {
    Arc::new(SimulatedBackend::new())
}
