//! Robot loop
//!
//! Called once per control period with the current button state. Each
//! tick, in order:
//!
//! 1. Button edges are turned into scheduler calls (press schedules,
//!    release cancels `while_held` bindings)
//! 2. Every active command is polled once
//! 3. The intake snapshot is published every configured number of ticks
//!
//! Commands only run while the robot is enabled. Disabling interrupts
//! everything and stops the intake.

use alloc::vec::Vec;

use heapless::String;

use notepath_core::command::{CommandHandle, CommandScheduler, LaunchPreset};
use notepath_core::config::MAX_LABEL_LEN;
use notepath_core::traits::Launcher;

use crate::bindings::{Action, Trigger};
use crate::config::{ConfigError, RobotConfig};
use crate::container::Robot;

struct Binding {
    mask: u32,
    action: Action,
    trigger: Trigger,
    /// Command scheduled by the last press
    handle: Option<CommandHandle>,
}

/// Periodic robot loop
pub struct RobotLoop<L: Launcher + 'static> {
    robot: Robot<L>,
    scheduler: CommandScheduler<Robot<L>>,
    bindings: Vec<Binding>,
    presets: Vec<(String<MAX_LABEL_LEN>, LaunchPreset)>,
    previous_buttons: u32,
    ticks: u32,
    publish_every: u32,
    enabled: bool,
}

impl<L: Launcher + 'static> RobotLoop<L> {
    /// Create the loop around a built robot
    ///
    /// The configuration must be the one the robot was built from; presets
    /// are validated again here.
    pub fn new(config: &RobotConfig, robot: Robot<L>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut presets = Vec::with_capacity(config.presets.len());
        for (index, preset) in config.presets.iter().enumerate() {
            let validated = LaunchPreset::try_from(preset)
                .map_err(|cause| ConfigError::InvalidPreset { index, cause })?;
            presets.push((preset.name.clone(), validated));
        }

        let bindings = config
            .bindings
            .iter()
            .map(|b| Binding {
                mask: 1 << b.button,
                action: b.action.clone(),
                trigger: b.trigger,
                handle: None,
            })
            .collect();

        Ok(Self {
            robot,
            scheduler: CommandScheduler::new(),
            bindings,
            presets,
            previous_buttons: 0,
            ticks: 0,
            publish_every: config.telemetry.publish_every_ticks,
            enabled: false,
        })
    }

    /// Get the robot
    pub fn robot(&self) -> &Robot<L> {
        &self.robot
    }

    /// Get the robot mutably (operator tools, tests)
    pub fn robot_mut(&mut self) -> &mut Robot<L> {
        &mut self.robot
    }

    /// Get the scheduler
    pub fn scheduler(&self) -> &CommandScheduler<Robot<L>> {
        &self.scheduler
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of ticks run since creation
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Enable the robot; commands start with the next press
    pub fn enable(&mut self) {
        if !self.enabled {
            info!("Robot enabled");
            self.enabled = true;
        }
    }

    /// Disable the robot: interrupt every command, stop the intake
    pub fn disable(&mut self) {
        if self.enabled {
            info!("Robot disabled");
        }
        self.enabled = false;
        self.scheduler.cancel_all(&mut self.robot);
        self.robot.stop_all();
        for binding in self.bindings.iter_mut() {
            binding.handle = None;
        }
    }

    /// Run one tick with the current button bitmask
    pub fn tick(&mut self, buttons: u32) {
        let pressed = buttons & !self.previous_buttons;
        let released = self.previous_buttons & !buttons;
        self.previous_buttons = buttons;

        if self.enabled {
            self.handle_buttons(pressed, released);
            self.scheduler.tick(&mut self.robot);
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % self.publish_every == 0 {
            self.robot.publish();
        }
    }

    fn handle_buttons(&mut self, pressed: u32, released: u32) {
        for binding in self.bindings.iter_mut() {
            if released & binding.mask != 0 && binding.trigger == Trigger::WhileHeld {
                if let Some(handle) = binding.handle.take() {
                    self.scheduler.cancel(&mut self.robot, handle);
                }
            }

            if pressed & binding.mask == 0 {
                continue;
            }
            let preset = binding
                .action
                .preset_name()
                .and_then(|name| self.presets.iter().find(|(n, _)| n.as_str() == name))
                .map(|(_, preset)| preset);
            let Some(command) = binding.action.command(preset) else {
                warn!("No preset for binding");
                continue;
            };
            match self.scheduler.schedule(&mut self.robot, command) {
                Ok(handle) => binding.handle = Some(handle),
                Err(e) => warn!("Binding not scheduled: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notepath_core::command::HasIntake;
    use notepath_core::config::FEEDER_IN_SPEED_KEY;
    use notepath_core::subsystem::{Stage, FEEDER_SENSOR_KEY};
    use notepath_drivers::sim::{LauncherEvent, SimHardware, SimLauncher};

    const ROBOT_TOML: &str = include_str!("../config/robot.toml");

    const INTAKE_IN: u32 = 1 << 0;
    const INDEX_UNTIL_NOTE: u32 = 1 << 2;
    const FEEDER_ALIGN: u32 = 1 << 3;
    const FEEDER_IN: u32 = 1 << 4;
    const SUBWOOFER: u32 = 1 << 5;
    const PODIUM: u32 = 1 << 6;

    struct Bench {
        hw: SimHardware,
        launcher: SimLauncher,
        robot: RobotLoop<SimLauncher>,
    }

    fn bench(angle_ticks: u32, speed_ticks: u32) -> Bench {
        let config = RobotConfig::from_toml(ROBOT_TOML).unwrap();
        let mut hw = SimHardware::new();
        let launcher = SimLauncher::new(angle_ticks, speed_ticks);
        let robot = Robot::new(&config, &mut hw, launcher.clone(), None).unwrap();
        let mut robot = RobotLoop::new(&config, robot).unwrap();
        robot.enable();
        Bench {
            hw,
            launcher,
            robot,
        }
    }

    impl Bench {
        fn tick(&mut self, buttons: u32) {
            self.robot.tick(buttons);
            self.launcher.step();
        }

        fn output(&self, id: u8) -> f64 {
            self.hw.motors().output(id)
        }

        fn speed_commands(&self, id: u8) -> u32 {
            self.hw.motors().device(id).map_or(0, |d| d.speed_commands)
        }
    }

    #[test]
    fn test_while_held_runs_until_release() {
        let mut bench = bench(0, 0);

        bench.tick(INTAKE_IN);
        assert_eq!(bench.output(20), 0.3);
        assert_eq!(bench.output(22), 0.3);
        bench.tick(INTAKE_IN);
        assert_eq!(bench.output(23), 0.3);

        bench.tick(0);
        assert_eq!(bench.output(20), 0.0);
        assert!(bench.robot.scheduler().is_empty());
    }

    #[test]
    fn test_press_tick_sends_one_speed_command() {
        let mut bench = bench(0, 0);

        let before = bench.speed_commands(20);
        bench.tick(INTAKE_IN);
        assert_eq!(bench.speed_commands(20), before + 1);
        bench.tick(INTAKE_IN);
        assert_eq!(bench.speed_commands(20), before + 2);

        bench.tick(0);
        let before = bench.speed_commands(30);
        bench.tick(INDEX_UNTIL_NOTE);
        assert_eq!(bench.speed_commands(30), before + 1);
        bench.tick(0);
        assert_eq!(bench.speed_commands(30), before + 2);
    }

    #[test]
    fn test_live_override_while_running() {
        let mut bench = bench(0, 0);

        bench.tick(FEEDER_IN);
        assert_eq!(bench.output(40), 0.3);

        bench
            .robot
            .robot()
            .tunables()
            .set(FEEDER_IN_SPEED_KEY, 0.5)
            .unwrap();
        bench.tick(FEEDER_IN);
        assert_eq!(bench.output(40), 0.5);
    }

    #[test]
    fn test_index_until_note() {
        let mut bench = bench(0, 0);

        bench.tick(INDEX_UNTIL_NOTE);
        bench.tick(0);
        assert_eq!(bench.output(31), 0.3);

        bench.hw.inputs().set_present(0, true);
        bench.tick(0);
        assert_eq!(bench.output(30), 0.0);
        assert!(bench.robot.scheduler().is_empty());
    }

    #[test]
    fn test_feeder_align_interrupts_feeder() {
        let mut bench = bench(0, 0);

        bench.tick(FEEDER_IN);
        assert_eq!(bench.output(40), 0.3);

        bench.tick(FEEDER_IN | FEEDER_ALIGN);
        assert_eq!(bench.output(40), 0.0);
        // Alignment finished on its first poll
        assert!(bench.robot.scheduler().is_empty());
    }

    #[test]
    fn test_preset_sequences_angle_then_speed() {
        let mut bench = bench(3, 2);

        bench.tick(SUBWOOFER);
        for _ in 0..2 {
            bench.tick(0);
            assert_eq!(bench.launcher.history(), [LauncherEvent::Angle(55.0)]);
        }

        bench.tick(0);
        assert_eq!(
            bench.launcher.history(),
            [LauncherEvent::Angle(55.0), LauncherEvent::Speed(0.6)]
        );
        assert!(!bench.robot.scheduler().is_empty());

        for _ in 0..3 {
            bench.tick(0);
        }
        assert!(bench.robot.scheduler().is_empty());
    }

    #[test]
    fn test_new_preset_interrupts_previous() {
        let mut bench = bench(5, 5);

        bench.tick(SUBWOOFER);
        bench.tick(0);
        bench.tick(PODIUM);

        for _ in 0..20 {
            bench.tick(0);
        }
        assert_eq!(
            bench.launcher.history(),
            [
                LauncherEvent::Angle(55.0),
                LauncherEvent::Angle(32.5),
                LauncherEvent::Speed(0.9),
            ]
        );
    }

    #[test]
    fn test_preset_runs_alongside_intake() {
        let mut bench = bench(0, 0);

        bench.tick(FEEDER_IN | SUBWOOFER);
        assert_eq!(bench.output(40), 0.3);
        assert_eq!(bench.robot.scheduler().len(), 2);
    }

    #[test]
    fn test_disable_stops_everything() {
        let mut bench = bench(10, 10);

        bench.tick(INTAKE_IN | SUBWOOFER);
        bench.robot.disable();

        assert!(bench.robot.scheduler().is_empty());
        assert_eq!(bench.output(20), 0.0);

        // Held buttons do nothing while disabled
        bench.tick(INTAKE_IN);
        assert_eq!(bench.output(20), 0.0);
    }

    #[test]
    fn test_no_commands_before_enable() {
        let config = RobotConfig::from_toml(ROBOT_TOML).unwrap();
        let mut hw = SimHardware::new();
        let robot = Robot::new(&config, &mut hw, SimLauncher::new(0, 0), None).unwrap();
        let mut robot = RobotLoop::new(&config, robot).unwrap();

        robot.tick(INTAKE_IN);
        assert!(!robot.is_enabled());
        assert_eq!(hw.motors().output(20), 0.0);
        assert_eq!(robot.robot_mut().intake().commanded_speed(Stage::Intake), 0.0);
    }

    #[test]
    fn test_telemetry_period() {
        let mut bench = bench(0, 0);
        bench.hw.inputs().set_present(1, true);

        for _ in 0..4 {
            bench.tick(0);
        }
        assert_eq!(
            bench.robot.robot().telemetry().get_bool(FEEDER_SENSOR_KEY),
            Some(false)
        );

        bench.tick(0);
        assert_eq!(
            bench.robot.robot().telemetry().get_bool(FEEDER_SENSOR_KEY),
            Some(true)
        );
    }
}
