// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bridge error types.
//!
//! Errors never cross the native boundary: the boundary layer converts
//! each variant into a sentinel (handle `0`, an error string) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Sentinel returned by `run` for a handle that is not registered.
pub const INVALID_HANDLE_MESSAGE: &str = "Invalid handle";

/// Errors that can occur while acquiring or using a native resource.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Native resource acquisition failed: {0}")]
    AcquisitionFailure(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(u64),

    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model file not readable: {path}: {reason}")]
    ModelUnreadable { path: PathBuf, reason: String },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns true if the caller can fix the cause and retry
    /// (install the model, fix permissions, re-download).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound(_)
                | Self::ModelUnreadable { .. }
                | Self::ChecksumMismatch { .. }
                | Self::InputValidation(_)
                | Self::Io(_)
        )
    }

    /// Returns true if this error should be logged as a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::InvalidHandle(_))
    }

    /// String surfaced to the managed host in place of an output.
    pub fn boundary_message(&self) -> String {
        match self {
            Self::InvalidHandle(_) => INVALID_HANDLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
