//! Model preflight and checksum tests against real files.

use std::io::Write;
use std::path::Path;

use llama_bridge::preflight::{sha256_file, verify_checksum, ModelPreflight};
use llama_bridge::BridgeError;
use tempfile::NamedTempFile;

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

fn file_with(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_preflight_reports_size() {
    let file = file_with(&[1u8; 5000]);
    let info = ModelPreflight::new(1024).check(file.path()).unwrap();
    assert_eq!(info.size_bytes, 5000);
    assert!(!info.suspiciously_small);
    assert_eq!(info.path, file.path());
}

#[test]
fn test_preflight_flags_small_file() {
    let file = file_with(b"tiny");
    let info = ModelPreflight::new(1024).check(file.path()).unwrap();
    assert!(info.suspiciously_small);
}

#[test]
fn test_preflight_threshold_is_exclusive() {
    let file = file_with(&[0u8; 1024]);
    let info = ModelPreflight::new(1024).check(file.path()).unwrap();
    assert!(!info.suspiciously_small);
}

#[test]
fn test_preflight_missing_file() {
    let err = ModelPreflight::new(1024)
        .check(Path::new("/definitely/not/here.gguf"))
        .unwrap_err();
    assert!(matches!(err, BridgeError::ModelNotFound(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_preflight_rejects_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModelPreflight::new(1024).check(dir.path()).unwrap_err();
    assert!(matches!(err, BridgeError::ModelUnreadable { .. }));
}

#[test]
fn test_sha256_known_vector() {
    let file = file_with(b"abc");
    assert_eq!(sha256_file(file.path()).unwrap(), ABC_SHA256);
}

#[test]
fn test_sha256_spans_chunks() {
    // Larger than one read buffer so the streaming path is exercised.
    let data = vec![7u8; 100_000];
    let file = file_with(&data);
    let first = sha256_file(file.path()).unwrap();
    let second = sha256_file(file.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn test_verify_checksum_accepts_uppercase_and_whitespace() {
    let file = file_with(b"abc");
    let expected = format!("  {}\n", ABC_SHA256.to_ascii_uppercase());
    verify_checksum(file.path(), &expected).unwrap();
}

#[test]
fn test_verify_checksum_mismatch() {
    let file = file_with(b"abd");
    match verify_checksum(file.path(), ABC_SHA256) {
        Err(BridgeError::ChecksumMismatch { expected, actual }) => {
            assert_eq!(expected, ABC_SHA256);
            assert_ne!(actual, ABC_SHA256);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[test]
fn test_verify_checksum_rejects_malformed_digest() {
    let file = file_with(b"abc");
    let malformed = ["".to_string(), "abc".to_string(), "g".repeat(64), "a".repeat(63)];
    for bad in &malformed {
        assert!(matches!(
            verify_checksum(file.path(), bad),
            Err(BridgeError::InputValidation(_))
        ));
    }
}
