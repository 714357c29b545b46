//! Test doubles shared by the unit tests of this crate

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::config::IntakeConfig;
use crate::subsystem::IntakeSubsystem;
use crate::traits::{
    DeviceId, DriverError, HardwareProvider, IdleMode, Launcher, MotorController, PresenceInput,
    SensorError, TelemetrySink, TunableRange, TunableStore,
};

/// Recorded state of one mock motor controller
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    pub configured: Option<(IdleMode, u8, bool)>,
    pub configure_calls: u32,
    pub direct_commands: u32,
    pub commanded: f64,
    pub leader: Option<DeviceId>,
    pub fail_configure: Option<DriverError>,
    pub fail_follow: Option<DriverError>,
}

/// Shared state of mock motors and inputs
#[derive(Clone, Default)]
pub struct MockBus {
    devices: Rc<RefCell<BTreeMap<DeviceId, MockDevice>>>,
    inputs: Rc<RefCell<BTreeMap<u8, Result<bool, SensorError>>>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn motor(&self, id: DeviceId) -> Box<dyn MotorController> {
        self.devices.borrow_mut().entry(id).or_default();
        Box::new(MockMotor {
            id,
            devices: self.devices.clone(),
        })
    }

    pub fn device(&self, id: DeviceId) -> MockDevice {
        self.devices.borrow().get(&id).cloned().unwrap_or_default()
    }

    /// Output of a device, resolving follower chains
    pub fn output(&self, id: DeviceId) -> f64 {
        let devices = self.devices.borrow();
        let mut current = id;
        while let Some(leader) = devices.get(&current).and_then(|d| d.leader) {
            current = leader;
        }
        devices.get(&current).map(|d| d.commanded).unwrap_or(0.0)
    }

    pub fn fail_configure(&self, id: DeviceId, err: DriverError) {
        self.devices.borrow_mut().entry(id).or_default().fail_configure = Some(err);
    }

    pub fn fail_follow(&self, id: DeviceId, err: DriverError) {
        self.devices.borrow_mut().entry(id).or_default().fail_follow = Some(err);
    }

    pub fn set_input(&self, channel: u8, value: Result<bool, SensorError>) {
        self.inputs.borrow_mut().insert(channel, value);
    }

    pub fn input(&self, channel: u8) -> Box<dyn PresenceInput> {
        Box::new(MockInput {
            channel,
            inputs: self.inputs.clone(),
        })
    }
}

impl HardwareProvider for MockBus {
    fn motor_controller(&mut self, id: DeviceId) -> Result<Box<dyn MotorController>, DriverError> {
        Ok(self.motor(id))
    }

    fn presence_input(&mut self, channel: u8) -> Result<Box<dyn PresenceInput>, DriverError> {
        Ok(self.input(channel))
    }
}

struct MockMotor {
    id: DeviceId,
    devices: Rc<RefCell<BTreeMap<DeviceId, MockDevice>>>,
}

impl MotorController for MockMotor {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn configure(
        &mut self,
        idle_mode: IdleMode,
        current_limit_amps: u8,
        persist: bool,
    ) -> Result<(), DriverError> {
        let mut devices = self.devices.borrow_mut();
        let device = devices.entry(self.id).or_default();
        if let Some(err) = device.fail_configure {
            return Err(err);
        }
        device.configure_calls += 1;
        device.configured = Some((idle_mode, current_limit_amps, persist));
        Ok(())
    }

    fn set_normalized_speed(&mut self, value: f64) {
        let mut devices = self.devices.borrow_mut();
        let device = devices.entry(self.id).or_default();
        device.direct_commands += 1;
        device.commanded = value;
    }

    fn follow(&mut self, leader: DeviceId) -> Result<(), DriverError> {
        let mut devices = self.devices.borrow_mut();
        let device = devices.entry(self.id).or_default();
        if let Some(err) = device.fail_follow {
            return Err(err);
        }
        device.leader = Some(leader);
        Ok(())
    }
}

struct MockInput {
    channel: u8,
    inputs: Rc<RefCell<BTreeMap<u8, Result<bool, SensorError>>>>,
}

impl PresenceInput for MockInput {
    fn read(&mut self) -> Result<bool, SensorError> {
        self.inputs
            .borrow()
            .get(&self.channel)
            .copied()
            .unwrap_or(Ok(false))
    }
}

/// In-memory tunable store
#[derive(Default)]
pub struct MockTunables {
    pub registered: RefCell<Vec<(String, f64, Option<TunableRange>, bool)>>,
    pub overrides: RefCell<BTreeMap<String, f64>>,
}

impl MockTunables {
    pub fn set(&self, key: &str, value: f64) {
        self.overrides.borrow_mut().insert(key.to_string(), value);
    }
}

impl TunableStore for MockTunables {
    fn register(&self, key: &str, default: f64, range: Option<TunableRange>, persistent: bool) {
        self.registered
            .borrow_mut()
            .push((key.to_string(), default, range, persistent));
    }

    fn get_or_default(&self, key: &str, default: f64) -> f64 {
        self.overrides.borrow().get(key).copied().unwrap_or(default)
    }
}

/// Telemetry sink keeping every published value
#[derive(Default)]
pub struct MockTelemetry {
    pub bools: BTreeMap<String, bool>,
    pub numbers: BTreeMap<String, f64>,
}

impl TelemetrySink for MockTelemetry {
    fn put_bool(&mut self, key: &str, value: bool) {
        self.bools.insert(key.to_string(), value);
    }

    fn put_number(&mut self, key: &str, value: f64) {
        self.numbers.insert(key.to_string(), value);
    }
}

/// Launcher directive, recorded in issue order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LauncherDirective {
    Angle(f64),
    Speed(f64),
}

/// Launcher whose completion signals are set by the test
#[derive(Debug, Default)]
pub struct MockLauncher {
    pub directives: Vec<LauncherDirective>,
    pub at_angle: bool,
    pub at_speed: bool,
}

impl Launcher for MockLauncher {
    fn set_angle(&mut self, degrees: f64) {
        self.directives.push(LauncherDirective::Angle(degrees));
    }

    fn is_at_angle(&mut self) -> bool {
        self.at_angle
    }

    fn set_launch_speed(&mut self, speed: f64) {
        self.directives.push(LauncherDirective::Speed(speed));
    }

    fn is_at_speed(&mut self) -> bool {
        self.at_speed
    }
}

/// Intake subsystem on mock hardware, with handles to inspect it
pub struct IntakeRig {
    pub bus: MockBus,
    pub tunables: Rc<MockTunables>,
    pub telemetry: MockTelemetry,
    pub intake: IntakeSubsystem,
}

impl IntakeRig {
    pub fn new() -> Self {
        let mut bus = MockBus::new();
        let tunables = Rc::new(MockTunables::default());
        let mut telemetry = MockTelemetry::default();
        let intake = IntakeSubsystem::new(
            &IntakeConfig::default(),
            &mut bus,
            tunables.clone(),
            &mut telemetry,
        )
        .unwrap();

        Self {
            bus,
            tunables,
            telemetry,
            intake,
        }
    }
}

/// Robot context holding both mechanisms
pub struct MockRobot {
    pub rig: IntakeRig,
    pub launcher: MockLauncher,
}

impl MockRobot {
    pub fn new() -> Self {
        Self {
            rig: IntakeRig::new(),
            launcher: MockLauncher::default(),
        }
    }
}

impl crate::command::HasIntake for MockRobot {
    fn intake(&mut self) -> &mut IntakeSubsystem {
        &mut self.rig.intake
    }
}

impl crate::command::HasLauncher for MockRobot {
    fn launcher(&mut self) -> &mut dyn Launcher {
        &mut self.launcher
    }
}
