//! Model file checks run before handing a path to the backend.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::BridgeError;

const HASH_CHUNK: usize = 32 * 1024;

/// Basic facts about a model file that passed preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Set when the file is smaller than the configured floor.
    pub suspiciously_small: bool,
}

/// Validates model files before acquisition.
#[derive(Debug, Clone)]
pub struct ModelPreflight {
    min_model_bytes: u64,
}

impl ModelPreflight {
    pub fn new(min_model_bytes: u64) -> Self {
        Self { min_model_bytes }
    }

    /// Check that the model exists and is readable.
    ///
    /// A tiny file is only warned about; some test and draft models are small.
    pub fn check(&self, path: &Path) -> Result<ModelInfo, BridgeError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BridgeError::ModelNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(BridgeError::ModelUnreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        if !metadata.is_file() {
            return Err(BridgeError::ModelUnreadable {
                path: path.to_path_buf(),
                reason: "not a regular file".into(),
            });
        }

        File::open(path).map_err(|e| BridgeError::ModelUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let size_bytes = metadata.len();
        let suspiciously_small = size_bytes < self.min_model_bytes;
        if suspiciously_small {
            tracing::warn!(
                path = %path.display(),
                size_bytes,
                min_bytes = self.min_model_bytes,
                "model file appears unexpectedly small"
            );
        }

        Ok(ModelInfo {
            path: path.to_path_buf(),
            size_bytes,
            suspiciously_small,
        })
    }
}

/// Stream a file through SHA-256 and return lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String, BridgeError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file against an expected SHA-256 (case-insensitive hex).
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), BridgeError> {
    let expected = expected.trim().to_ascii_lowercase();
    if expected.len() != 64 || !expected.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BridgeError::InputValidation(
            "sha256 must be 64 hex characters".into(),
        ));
    }
    let actual = sha256_file(path)?;
    if actual != expected {
        return Err(BridgeError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
