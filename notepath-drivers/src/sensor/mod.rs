//! Presence sensor adapters

pub mod digital;

pub use digital::DigitalPresence;
