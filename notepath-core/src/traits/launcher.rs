//! Launcher mechanism trait
//!
//! The launcher's closed-loop angle and wheel-speed control live behind
//! this trait. The core forwards setpoints and waits on the completion
//! signals; it never inspects how they are reached.

/// Trait for the launcher mechanism
pub trait Launcher {
    /// Command the launcher pivot to `degrees`
    fn set_angle(&mut self, degrees: f64);

    /// Check if the last commanded angle has been reached
    fn is_at_angle(&mut self) -> bool;

    /// Command the launcher wheels to a normalized speed in `[-1, 1]`
    fn set_launch_speed(&mut self, speed: f64);

    /// Check if the last commanded speed has been reached
    fn is_at_speed(&mut self) -> bool;
}
