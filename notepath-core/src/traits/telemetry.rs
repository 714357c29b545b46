//! Telemetry output trait

/// Display-only destination for read-outs (driver station dashboard)
///
/// Nothing written here ever feeds back into control decisions.
pub trait TelemetrySink {
    /// Publish a boolean read-out
    fn put_bool(&mut self, key: &str, value: bool);

    /// Publish a numeric read-out
    fn put_number(&mut self, key: &str, value: f64);
}
