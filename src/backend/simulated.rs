//! Simulated backend used when no inference library is linked.
//!
//! Acquisition always succeeds and generation echoes the prompt, which is
//! enough to exercise the full handle lifecycle from a host app.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{LoadRequest, ModelBackend, ModelResource};
use crate::error::BridgeError;

pub const SIMULATED_RESPONSE_PREFIX: &str = "Simulated llama.cpp response for prompt: ";

/// Backend producing [`SimulatedContext`]s.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    live: Arc<AtomicUsize>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contexts acquired and not yet released.
    pub fn live_contexts(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl ModelBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn load(&self, request: &LoadRequest) -> Result<Box<dyn ModelResource>, BridgeError> {
        if request.model_path.as_os_str().is_empty() {
            return Err(BridgeError::AcquisitionFailure("empty model path".into()));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedContext {
            model_path: request.model_path.clone(),
            n_ctx: request.n_ctx,
            live: self.live.clone(),
        }))
    }
}

/// Placeholder context standing in for a loaded model.
#[derive(Debug)]
pub struct SimulatedContext {
    model_path: PathBuf,
    n_ctx: u32,
    live: Arc<AtomicUsize>,
}

impl SimulatedContext {
    pub fn n_ctx(&self) -> u32 {
        self.n_ctx
    }
}

impl ModelResource for SimulatedContext {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, BridgeError> {
        let limit = usize::try_from(max_tokens).unwrap_or(usize::MAX);
        // Whitespace words stand in for tokens.
        let echoed = if prompt.split_whitespace().count() > limit {
            prompt.split_whitespace().take(limit).collect::<Vec<_>>().join(" ")
        } else {
            prompt.to_string()
        };
        Ok(format!("{SIMULATED_RESPONSE_PREFIX}{echoed}"))
    }

    fn describe(&self) -> String {
        format!("simulated({}, n_ctx={})", self.model_path.display(), self.n_ctx)
    }
}

impl Drop for SimulatedContext {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(model = %self.model_path.display(), "simulated context freed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_contains_prompt() {
        let backend = SimulatedBackend::new();
        let ctx = backend.load(&LoadRequest::new("model.bin", 2048)).unwrap();
        let out = ctx.generate("hello", 16).unwrap();
        assert_eq!(out, "Simulated llama.cpp response for prompt: hello");
    }

    #[test]
    fn test_long_prompt_truncated_to_limit() {
        let backend = SimulatedBackend::new();
        let ctx = backend.load(&LoadRequest::new("model.bin", 2048)).unwrap();
        let out = ctx.generate("one two three four", 2).unwrap();
        assert!(out.ends_with("one two"));
    }

    #[test]
    fn test_empty_path_fails() {
        let backend = SimulatedBackend::new();
        let result = backend.load(&LoadRequest::new("", 2048));
        assert!(matches!(result, Err(BridgeError::AcquisitionFailure(_))));
        assert_eq!(backend.live_contexts(), 0);
    }

    #[test]
    fn test_drop_releases_context() {
        let backend = SimulatedBackend::new();
        let ctx = backend.load(&LoadRequest::new("model.bin", 512)).unwrap();
        assert_eq!(backend.live_contexts(), 1);
        assert!(ctx.describe().contains("n_ctx=512"));
        drop(ctx);
        assert_eq!(backend.live_contexts(), 0);
    }
}
