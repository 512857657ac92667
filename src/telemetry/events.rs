//! Bridge lifecycle event logging.
//!
//! Handle churn is debug noise; failures at the boundary are the events
//! worth keeping, since the host only ever sees a sentinel for them.

/// Lifecycle events emitted by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Resource acquired and registered.
    HandleCreated,
    /// Resource released by close.
    HandleReleased,
    /// Close on a handle that was not registered.
    HandleAlreadyClosed,
    /// Use or close referenced an unknown handle.
    InvalidHandle,
    /// Backend could not acquire the resource.
    AcquisitionFailed,
    /// Model file failed preflight checks.
    PreflightFailed,
    /// Model file hash did not match.
    ChecksumMismatch,
    /// Backend failed during generation.
    InferenceFailed,
}

/// Severity levels for bridge events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl BridgeEvent {
    /// Get the severity level for this event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            Self::HandleCreated => EventSeverity::Info,
            Self::HandleReleased => EventSeverity::Info,
            Self::HandleAlreadyClosed => EventSeverity::Debug,
            Self::InvalidHandle => EventSeverity::Warning,
            Self::AcquisitionFailed => EventSeverity::Error,
            Self::PreflightFailed => EventSeverity::Warning,
            Self::ChecksumMismatch => EventSeverity::Critical,
            Self::InferenceFailed => EventSeverity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandleCreated => "handle_created",
            Self::HandleReleased => "handle_released",
            Self::HandleAlreadyClosed => "handle_already_closed",
            Self::InvalidHandle => "invalid_handle",
            Self::AcquisitionFailed => "acquisition_failed",
            Self::PreflightFailed => "preflight_failed",
            Self::ChecksumMismatch => "checksum_mismatch",
            Self::InferenceFailed => "inference_failed",
        }
    }
}

/// Log a bridge event against a handle id (0 when none was issued).
pub fn log_bridge_event(event: BridgeEvent, handle: u64, detail: &str) {
    let kind = event.as_str();
    match event.severity() {
        EventSeverity::Debug => tracing::debug!(event = kind, handle, "{}", detail),
        EventSeverity::Info => tracing::info!(event = kind, handle, "{}", detail),
        EventSeverity::Warning => tracing::warn!(event = kind, handle, "{}", detail),
        EventSeverity::Error => tracing::error!(event = kind, handle, "{}", detail),
        EventSeverity::Critical => {
            tracing::error!(event = kind, handle, critical = true, "{}", detail)
        }
    }
}
