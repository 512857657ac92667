//! Telemetry module tests for llama-bridge.

use llama_bridge::telemetry::{
    init_logging, log_bridge_event, BridgeEvent, EventSeverity, LogConfig, LogError, LogFormat,
};
use std::path::PathBuf;

// =============================================================================
// LogConfig Tests
// =============================================================================

#[test]
fn log_config_default_is_json() {
    let config = LogConfig::default();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, "info");
    assert!(config.output_path.is_none());
}

#[test]
fn log_config_with_output_path() {
    let config = LogConfig {
        format: LogFormat::Pretty,
        level: "llama_bridge=trace".to_string(),
        output_path: Some(PathBuf::from("/tmp/llama-bridge.log")),
    };
    assert_eq!(config.output_path.unwrap().to_str(), Some("/tmp/llama-bridge.log"));
}

#[test]
fn invalid_filter_is_rejected() {
    let config = LogConfig {
        format: LogFormat::Json,
        level: "llama_bridge=notalevel".to_string(),
        output_path: None,
    };
    assert!(matches!(init_logging(&config), Err(LogError::InvalidFilter(_))));
}

// =============================================================================
// BridgeEvent Tests
// =============================================================================

#[test]
fn failures_outrank_lifecycle_events() {
    assert!(BridgeEvent::AcquisitionFailed.severity() > BridgeEvent::HandleCreated.severity());
    assert!(BridgeEvent::InvalidHandle.severity() > BridgeEvent::HandleAlreadyClosed.severity());
    assert_eq!(BridgeEvent::ChecksumMismatch.severity(), EventSeverity::Critical);
}

#[test]
fn event_names_are_snake_case() {
    let events = [
        BridgeEvent::HandleCreated,
        BridgeEvent::HandleReleased,
        BridgeEvent::HandleAlreadyClosed,
        BridgeEvent::InvalidHandle,
        BridgeEvent::AcquisitionFailed,
        BridgeEvent::PreflightFailed,
        BridgeEvent::ChecksumMismatch,
        BridgeEvent::InferenceFailed,
    ];
    for event in events {
        let name = event.as_str();
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{name}");
    }
}

#[test]
fn logging_without_subscriber_is_silent() {
    log_bridge_event(BridgeEvent::InvalidHandle, 99, "no subscriber installed");
    log_bridge_event(BridgeEvent::ChecksumMismatch, 0, "still fine");
}
