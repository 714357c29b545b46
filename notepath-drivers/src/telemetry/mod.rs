//! Telemetry sinks

pub mod table;

pub use table::{TelemetryTable, TelemetryValue, MAX_ENTRIES};
