//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and
//! hardware-specific implementations. The core never names a concrete
//! device type.

pub mod hardware;
pub mod launcher;
pub mod motor;
pub mod sensor;
pub mod telemetry;
pub mod tunable;

pub use hardware::HardwareProvider;
pub use launcher::Launcher;
pub use motor::{DeviceId, DriverError, IdleMode, MotorController};
pub use sensor::{PresenceInput, SensorError};
pub use telemetry::TelemetrySink;
pub use tunable::{TunableRange, TunableStore};
