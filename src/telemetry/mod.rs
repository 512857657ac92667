//! Telemetry module.
//!
//! Structured logging via `tracing`; no network exporters.

mod events;
mod logging;

pub use events::{log_bridge_event, BridgeEvent, EventSeverity};
pub use logging::{init_logging, LogConfig, LogError, LogFormat};
