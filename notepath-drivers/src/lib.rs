//! Device adapters for the note pipeline
//!
//! This crate provides concrete implementations of the traits defined
//! in notepath-core:
//!
//! - Presence sensors over `embedded-hal` digital inputs
//! - Simulated hardware (motor controller bus, inputs, launcher) for
//!   bench runs and host tests
//! - In-memory tunable table with persistence of operator overrides
//! - Key/value telemetry table

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
extern crate notepath_core;

pub mod sensor;
pub mod sim;
pub mod telemetry;
pub mod tunable;
