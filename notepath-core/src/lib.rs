//! Hardware-agnostic core logic for the note handling mechanisms
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware capability traits (motor controller, presence input,
//!   tunable store, launcher, telemetry)
//! - Actuator groups (primary + followers) and presence sensors
//! - The intake pipeline subsystem (intake → index → feeder)
//! - Command framework: atomic commands, sequences, launch presets
//! - A cooperative command scheduler enforcing exclusive requirements
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod actuator;
pub mod command;
pub mod config;
pub mod sensor;
pub mod subsystem;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
