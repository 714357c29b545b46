//! Configuration types
//!
//! Hardware-agnostic configuration structures. Assembled once at startup
//! and passed by reference to the subsystems that need them.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
