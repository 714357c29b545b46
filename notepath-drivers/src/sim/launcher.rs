//! Simulated launcher
//!
//! Reaches each setpoint a fixed number of ticks after it is commanded.
//! Call [`SimLauncher::step`] once per robot loop tick.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use notepath_core::traits::Launcher;

/// Directive received by the simulated launcher
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LauncherEvent {
    Angle(f64),
    Speed(f64),
}

#[derive(Debug, Default)]
struct Axis {
    setpoint: Option<f64>,
    remaining: u32,
}

impl Axis {
    fn command(&mut self, value: f64, settle_ticks: u32) {
        self.setpoint = Some(value);
        self.remaining = settle_ticks;
    }

    fn step(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn settled(&self) -> bool {
        self.setpoint.is_some() && self.remaining == 0
    }
}

#[derive(Debug, Default)]
struct State {
    angle: Axis,
    speed: Axis,
    history: Vec<LauncherEvent>,
}

/// Launcher settling after a fixed delay
///
/// Clones share state, so a test can keep one handle while the robot
/// owns another.
#[derive(Debug, Clone)]
pub struct SimLauncher {
    angle_settle_ticks: u32,
    speed_settle_ticks: u32,
    state: Rc<RefCell<State>>,
}

impl SimLauncher {
    /// Create a launcher settling after the given number of ticks
    pub fn new(angle_settle_ticks: u32, speed_settle_ticks: u32) -> Self {
        Self {
            angle_settle_ticks,
            speed_settle_ticks,
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Advance simulated time by one tick
    pub fn step(&self) {
        let mut state = self.state.borrow_mut();
        state.angle.step();
        state.speed.step();
    }

    /// Get every directive received so far, in order
    pub fn history(&self) -> Vec<LauncherEvent> {
        self.state.borrow().history.clone()
    }

    pub fn angle_setpoint(&self) -> Option<f64> {
        self.state.borrow().angle.setpoint
    }

    pub fn speed_setpoint(&self) -> Option<f64> {
        self.state.borrow().speed.setpoint
    }
}

impl Launcher for SimLauncher {
    fn set_angle(&mut self, degrees: f64) {
        let mut state = self.state.borrow_mut();
        state.angle.command(degrees, self.angle_settle_ticks);
        state.history.push(LauncherEvent::Angle(degrees));
    }

    fn is_at_angle(&mut self) -> bool {
        self.state.borrow().angle.settled()
    }

    fn set_launch_speed(&mut self, speed: f64) {
        let mut state = self.state.borrow_mut();
        state.speed.command(speed, self.speed_settle_ticks);
        state.history.push(LauncherEvent::Speed(speed));
    }

    fn is_at_speed(&mut self) -> bool {
        self.state.borrow().speed.settled()
    }
}
