//! Robot container
//!
//! Owns every subsystem plus the operator-facing stores (tunables and
//! telemetry). Commands receive it as their context.

use alloc::rc::Rc;

use notepath_core::command::{HasIntake, HasLauncher};
use notepath_core::subsystem::IntakeSubsystem;
use notepath_core::traits::{HardwareProvider, Launcher};
use notepath_drivers::telemetry::TelemetryTable;
use notepath_drivers::tunable::{TunableError, TunableTable};

use crate::config::{ConfigError, RobotConfig};

/// The robot: intake pipeline, launcher, tunables and telemetry
pub struct Robot<L> {
    intake: IntakeSubsystem,
    launcher: L,
    tunables: Rc<TunableTable>,
    telemetry: TelemetryTable,
}

impl<L: Launcher> Robot<L> {
    /// Build the robot
    ///
    /// Brings the intake up on `hardware`, then restores persisted
    /// tunable overrides when `persisted` holds a saved table. A startup
    /// failure is fatal; a corrupt tunable table is not.
    pub fn new(
        config: &RobotConfig,
        hardware: &mut dyn HardwareProvider,
        launcher: L,
        persisted: Option<&[u8]>,
    ) -> Result<Self, ConfigError> {
        let tunables = Rc::new(TunableTable::new());
        let mut telemetry = TelemetryTable::new();

        let intake = IntakeSubsystem::new(
            &config.intake_config(),
            hardware,
            tunables.clone(),
            &mut telemetry,
        )
        .map_err(|e| {
            error!("Intake startup failed: {}", e);
            ConfigError::Startup(e)
        })?;

        if let Some(bytes) = persisted {
            if let Err(e) = tunables.restore(bytes) {
                warn!("Ignoring persisted tunables: {}", e);
            }
        }

        info!("Robot ready");
        Ok(Self {
            intake,
            launcher,
            tunables,
            telemetry,
        })
    }

    /// Get the live tunable table (operator dashboard)
    pub fn tunables(&self) -> &TunableTable {
        &self.tunables
    }

    /// Save persistent tunable overrides into `buffer`
    pub fn save_tunables<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], TunableError> {
        self.tunables.save(buffer)
    }

    /// Get the telemetry table
    pub fn telemetry(&self) -> &TelemetryTable {
        &self.telemetry
    }

    /// Publish the intake snapshot to the telemetry table
    pub fn publish(&mut self) {
        self.intake.publish(&mut self.telemetry);
    }

    /// Stop every mechanism the robot drives directly
    pub fn stop_all(&mut self) {
        self.intake.stop_all();
    }
}

impl<L> HasIntake for Robot<L> {
    fn intake(&mut self) -> &mut IntakeSubsystem {
        &mut self.intake
    }
}

impl<L: Launcher> HasLauncher for Robot<L> {
    fn launcher(&mut self) -> &mut dyn Launcher {
        &mut self.launcher
    }
}
