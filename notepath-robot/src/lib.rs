//! Robot wiring for the note pipeline
//!
//! Assembles the mechanisms from a TOML robot configuration and runs them:
//!
//! - [`config`]: robot configuration, parsed and validated once at startup
//! - [`container`]: the robot context owning every subsystem
//! - [`bindings`]: operator buttons mapped to commands and launch presets
//! - [`runner`]: the periodic robot loop (edge detection, scheduling,
//!   telemetry)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
extern crate notepath_core;

pub mod bindings;
pub mod config;
pub mod container;
pub mod runner;

pub use config::{ConfigError, RobotConfig};
pub use container::Robot;
pub use runner::RobotLoop;
