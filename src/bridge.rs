// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Boundary object pairing a handle registry with an inference backend.
//!
//! Hosts call the sentinel-valued `init` / `run` / `release` trio; Rust
//! callers can use the typed `open` / `infer` / `close` equivalents.

use std::path::Path;
use std::sync::Arc;

use crate::backend::{default_backend, LoadRequest, ModelBackend, ModelResource};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::preflight::{self, ModelPreflight};
use crate::registry::{Handle, HandleRegistry, HandleState};
use crate::telemetry::{log_bridge_event, BridgeEvent};

/// Result of [`LlamaBridge::safe_init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Success { handle: Handle },
    Failure { reason: String, recoverable: bool },
}

impl InitOutcome {
    /// The issued handle, or [`Handle::INVALID`] on failure.
    pub fn handle(&self) -> Handle {
        match self {
            Self::Success { handle } => *handle,
            Self::Failure { .. } => Handle::INVALID,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Native bridge instance.
pub struct LlamaBridge {
    registry: HandleRegistry<Box<dyn ModelResource>>,
    backend: Arc<dyn ModelBackend>,
    preflight: ModelPreflight,
    config: BridgeConfig,
}

impl LlamaBridge {
    pub fn new(backend: Arc<dyn ModelBackend>, config: BridgeConfig) -> Self {
        Self {
            registry: HandleRegistry::new(),
            backend,
            preflight: ModelPreflight::new(config.min_model_bytes),
            config,
        }
    }

    /// Build with the backend chosen by crate features.
    pub fn from_config(config: BridgeConfig) -> Self {
        let backend = default_backend(&config);
        Self::new(backend, config)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn registry(&self) -> &HandleRegistry<Box<dyn ModelResource>> {
        &self.registry
    }

    pub fn state(&self, handle: Handle) -> HandleState {
        self.registry.state(handle)
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.registry.len()
    }

    /// Acquire a resource and register it.
    pub fn open(&self, request: &LoadRequest) -> Result<Handle, BridgeError> {
        if request.model_path.as_os_str().is_empty() {
            log_bridge_event(BridgeEvent::AcquisitionFailed, 0, "empty model path");
            return Err(BridgeError::AcquisitionFailure("empty model path".into()));
        }

        let backend = &self.backend;
        match self.registry.create(|| backend.load(request)) {
            Ok(handle) => {
                log_bridge_event(
                    BridgeEvent::HandleCreated,
                    handle.id(),
                    &format!("{} n_ctx={}", request.model_path.display(), request.n_ctx),
                );
                Ok(handle)
            }
            Err(e) => {
                log_bridge_event(BridgeEvent::AcquisitionFailed, 0, &e.to_string());
                Err(e)
            }
        }
    }

    /// Generate against a live handle.
    pub fn infer(&self, handle: Handle, prompt: &str, max_tokens: u32) -> Result<String, BridgeError> {
        let resource = self.registry.get(handle).map_err(|e| {
            log_bridge_event(BridgeEvent::InvalidHandle, handle.id(), "infer on unknown handle");
            e
        })?;
        resource.generate(prompt, max_tokens).map_err(|e| {
            log_bridge_event(BridgeEvent::InferenceFailed, handle.id(), &e.to_string());
            e
        })
    }

    /// Close a handle. Returns false if it was not open.
    pub fn close(&self, handle: Handle) -> bool {
        let closed = self.registry.close(handle);
        if closed {
            log_bridge_event(BridgeEvent::HandleReleased, handle.id(), "closed");
        } else {
            log_bridge_event(BridgeEvent::HandleAlreadyClosed, handle.id(), "close ignored");
        }
        closed
    }

    /// Host `init`: returns a handle, or 0 on failure.
    pub fn init(&self, model_path: &str, context_size: i32) -> i64 {
        let request = LoadRequest::new(model_path, self.config.context_size_or_default(context_size));
        self.open(&request)
            .map(|h| h.as_raw())
            .unwrap_or(Handle::INVALID.as_raw())
    }

    /// Host `run`: returns the output, or an error string such as `"Invalid handle"`.
    pub fn run(&self, handle: i64, input: &str, max_tokens: i32) -> String {
        let max_tokens = self.config.max_tokens_or_default(max_tokens);
        match self.infer(Handle::from_raw(handle), input, max_tokens) {
            Ok(text) => text,
            Err(e) => e.boundary_message(),
        }
    }

    /// Host `release`: idempotent, silent for unknown handles.
    pub fn release(&self, handle: i64) {
        self.close(Handle::from_raw(handle));
    }

    /// Preflight the model file, optionally verify its hash, then `init`.
    pub fn safe_init(
        &self,
        model_path: &str,
        context_size: i32,
        expected_sha256: Option<&str>,
    ) -> InitOutcome {
        match self.checked_open(model_path, context_size, expected_sha256) {
            Ok(handle) => InitOutcome::Success { handle },
            Err(e) => InitOutcome::Failure {
                reason: e.to_string(),
                recoverable: e.is_recoverable(),
            },
        }
    }

    fn checked_open(
        &self,
        model_path: &str,
        context_size: i32,
        expected_sha256: Option<&str>,
    ) -> Result<Handle, BridgeError> {
        let path = Path::new(model_path);
        self.preflight.check(path).map_err(|e| {
            log_bridge_event(BridgeEvent::PreflightFailed, 0, &e.to_string());
            e
        })?;
        if let Some(expected) = expected_sha256 {
            preflight::verify_checksum(path, expected).map_err(|e| {
                if matches!(e, BridgeError::ChecksumMismatch { .. }) {
                    log_bridge_event(BridgeEvent::ChecksumMismatch, 0, &e.to_string());
                }
                e
            })?;
        }
        let request = LoadRequest::new(path, self.config.context_size_or_default(context_size));
        self.open(&request)
    }

    /// One-shot init, generate, close. The handle is closed even if generation fails.
    pub fn respond(&self, model_path: &str, prompt: &str, max_tokens: i32) -> Result<String, BridgeError> {
        let request = LoadRequest::new(model_path, self.config.n_ctx);
        let handle = self.open(&request)?;
        let result = self.infer(handle, prompt, self.config.max_tokens_or_default(max_tokens));
        self.close(handle);
        result
    }
}

impl Drop for LlamaBridge {
    fn drop(&mut self) {
        let released = self.registry.close_all();
        if released > 0 {
            tracing::info!(released, "bridge dropped with open handles");
        }
    }
}
