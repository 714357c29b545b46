//! Actuator groups
//!
//! An actuator group is one primary motor controller plus zero or more
//! followers that must always move identically, under one logical name
//! (intake rollers, index belts, feeder roller).
//!
//! # Lifecycle
//!
//! ```text
//! Unconfigured ──configure()──▶ Configured ──bind_followers()──▶ Ready
//! ```
//!
//! Speed commands are only forwarded in `Ready`. Followers are bound once
//! and never receive a direct speed command; they mirror the primary in
//! the device itself.

use alloc::boxed::Box;
use heapless::Vec;

use crate::config::MotorSafetyConfig;
use crate::traits::{DeviceId, DriverError, MotorController};

/// Maximum followers per group
pub const MAX_FOLLOWERS: usize = 3;

/// Group lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GroupState {
    /// Handles opened, nothing written to the devices yet
    Unconfigured,
    /// Safety settings applied to every device
    Configured,
    /// Followers bound; speed commands accepted
    Ready,
}

/// Errors that can occur while bringing up a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// A device rejected its safety configuration
    Configure {
        /// Group name
        group: &'static str,
        /// Failing device
        device: DeviceId,
        /// Driver error
        cause: DriverError,
    },
    /// A follower could not be bound to the primary
    Follow {
        /// Group name
        group: &'static str,
        /// Failing follower
        device: DeviceId,
        /// Driver error
        cause: DriverError,
    },
    /// Followers bound before the group was configured
    NotConfigured {
        /// Group name
        group: &'static str,
    },
    /// More followers than [`MAX_FOLLOWERS`]
    TooManyFollowers {
        /// Group name
        group: &'static str,
    },
}

/// Motor controllers that move together under one name
pub struct ActuatorGroup {
    name: &'static str,
    primary: Box<dyn MotorController>,
    followers: Vec<Box<dyn MotorController>, MAX_FOLLOWERS>,
    /// Last commanded speed (last value wins)
    commanded: f64,
    state: GroupState,
}

impl ActuatorGroup {
    /// Create a new group from opened device handles
    pub fn new<I>(
        name: &'static str,
        primary: Box<dyn MotorController>,
        followers: I,
    ) -> Result<Self, ActuatorError>
    where
        I: IntoIterator<Item = Box<dyn MotorController>>,
    {
        let mut group = Self {
            name,
            primary,
            followers: Vec::new(),
            commanded: 0.0,
            state: GroupState::Unconfigured,
        };
        for follower in followers {
            group
                .followers
                .push(follower)
                .map_err(|_| ActuatorError::TooManyFollowers { group: name })?;
        }
        Ok(group)
    }

    /// Get the group name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the lifecycle state
    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Check if speed commands are accepted
    pub fn is_ready(&self) -> bool {
        self.state == GroupState::Ready
    }

    /// Get the primary's ID
    pub fn primary_id(&self) -> DeviceId {
        self.primary.id()
    }

    /// Iterate over the followers' IDs
    pub fn follower_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.followers.iter().map(|f| f.id())
    }

    /// Get the last commanded speed
    pub fn commanded_speed(&self) -> f64 {
        self.commanded
    }

    /// Apply the safety configuration to the primary and every follower
    ///
    /// Stops at the first device that rejects its configuration; the group
    /// stays unconfigured and will not accept speed commands.
    pub fn configure(&mut self, safety: &MotorSafetyConfig) -> Result<(), ActuatorError> {
        let devices = core::iter::once(&mut self.primary).chain(self.followers.iter_mut());
        for device in devices {
            let id = device.id();
            device
                .configure(safety.idle_mode, safety.current_limit_amps, safety.persist)
                .map_err(|cause| {
                    error!("{}: configuring device {} failed: {}", self.name, id, cause);
                    ActuatorError::Configure {
                        group: self.name,
                        device: id,
                        cause,
                    }
                })?;
            debug!("{}: device {} configured", self.name, id);
        }

        self.state = GroupState::Configured;
        Ok(())
    }

    /// Bind every follower to the primary
    pub fn bind_followers(&mut self) -> Result<(), ActuatorError> {
        if self.state == GroupState::Unconfigured {
            return Err(ActuatorError::NotConfigured { group: self.name });
        }

        let leader = self.primary.id();
        for follower in self.followers.iter_mut() {
            let id = follower.id();
            follower.follow(leader).map_err(|cause| {
                error!("{}: device {} cannot follow {}: {}", self.name, id, leader, cause);
                ActuatorError::Follow {
                    group: self.name,
                    device: id,
                    cause,
                }
            })?;
            debug!("{}: device {} follows {}", self.name, id, leader);
        }

        self.state = GroupState::Ready;
        Ok(())
    }

    /// Command the group to a normalized speed
    ///
    /// Forwarded to the primary only. No clamping is done here; callers
    /// supply values in `[-1, 1]`.
    pub fn set_speed(&mut self, value: f64) {
        if self.state != GroupState::Ready {
            warn!("{}: speed command dropped, group not ready", self.name);
            return;
        }

        self.primary.set_normalized_speed(value);
        self.commanded = value;
    }

    /// Stop the group
    pub fn stop(&mut self) {
        self.set_speed(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBus;
    use crate::traits::IdleMode;
    use alloc::vec;
    use proptest::prelude::*;

    fn intake_group(bus: &MockBus) -> ActuatorGroup {
        ActuatorGroup::new(
            "intake",
            bus.motor(20),
            vec![bus.motor(21), bus.motor(22), bus.motor(23)],
        )
        .unwrap()
    }

    fn ready_group(bus: &MockBus) -> ActuatorGroup {
        let mut group = intake_group(bus);
        group.configure(&MotorSafetyConfig::default()).unwrap();
        group.bind_followers().unwrap();
        group
    }

    #[test]
    fn test_initial_state() {
        let bus = MockBus::new();
        let group = intake_group(&bus);

        assert_eq!(group.state(), GroupState::Unconfigured);
        assert_eq!(group.primary_id(), 20);
        assert!(group.follower_ids().eq([21, 22, 23]));
        assert_eq!(group.commanded_speed(), 0.0);
    }

    #[test]
    fn test_too_many_followers() {
        let bus = MockBus::new();
        let result = ActuatorGroup::new(
            "intake",
            bus.motor(20),
            vec![bus.motor(21), bus.motor(22), bus.motor(23), bus.motor(24)],
        );
        assert_eq!(
            result.err(),
            Some(ActuatorError::TooManyFollowers { group: "intake" })
        );
    }

    #[test]
    fn test_configure_applies_safety_to_every_device() {
        let bus = MockBus::new();
        let mut group = intake_group(&bus);
        group.configure(&MotorSafetyConfig::default()).unwrap();

        for id in [20, 21, 22, 23] {
            let device = bus.device(id);
            assert_eq!(device.configured, Some((IdleMode::Brake, 20, true)));
            assert_eq!(device.configure_calls, 1);
        }
        assert_eq!(group.state(), GroupState::Configured);
    }

    #[test]
    fn test_configure_failure_is_reported() {
        let bus = MockBus::new();
        bus.fail_configure(22, DriverError::Timeout);
        let mut group = intake_group(&bus);

        let err = group.configure(&MotorSafetyConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ActuatorError::Configure {
                group: "intake",
                device: 22,
                cause: DriverError::Timeout,
            }
        );
        assert_eq!(group.state(), GroupState::Unconfigured);
        assert_eq!(bus.device(23).configure_calls, 0);
    }

    #[test]
    fn test_bind_requires_configure() {
        let bus = MockBus::new();
        let mut group = intake_group(&bus);
        assert_eq!(
            group.bind_followers(),
            Err(ActuatorError::NotConfigured { group: "intake" })
        );
    }

    #[test]
    fn test_follow_failure_is_reported() {
        let bus = MockBus::new();
        bus.fail_follow(23, DriverError::Disconnected);
        let mut group = intake_group(&bus);
        group.configure(&MotorSafetyConfig::default()).unwrap();

        let err = group.bind_followers().unwrap_err();
        assert!(matches!(err, ActuatorError::Follow { device: 23, .. }));
        assert!(!group.is_ready());
    }

    #[test]
    fn test_speed_dropped_until_ready() {
        let bus = MockBus::new();
        let mut group = intake_group(&bus);
        group.set_speed(0.5);

        assert_eq!(bus.device(20).direct_commands, 0);
        assert_eq!(group.commanded_speed(), 0.0);
    }

    #[test]
    fn test_speed_goes_to_primary_only() {
        let bus = MockBus::new();
        let mut group = ready_group(&bus);
        group.set_speed(0.3);

        assert_eq!(bus.device(20).direct_commands, 1);
        for id in [21, 22, 23] {
            assert_eq!(bus.device(id).direct_commands, 0);
            assert_eq!(bus.device(id).leader, Some(20));
            assert_eq!(bus.output(id), 0.3);
        }
    }

    #[test]
    fn test_stop_commands_zero() {
        let bus = MockBus::new();
        let mut group = ready_group(&bus);
        group.set_speed(-0.7);
        group.stop();

        assert_eq!(group.commanded_speed(), 0.0);
        assert_eq!(bus.output(20), 0.0);
        assert_eq!(bus.output(23), 0.0);
    }

    #[test]
    fn test_out_of_range_passes_through() {
        let bus = MockBus::new();
        let mut group = ready_group(&bus);
        group.set_speed(1.5);
        assert_eq!(bus.output(20), 1.5);
    }

    proptest! {
        #[test]
        fn followers_mirror_primary(speeds in prop::collection::vec(-1.0f64..=1.0, 1..32)) {
            let bus = MockBus::new();
            let mut group = ready_group(&bus);

            for speed in speeds {
                group.set_speed(speed);
                for id in [21, 22, 23] {
                    prop_assert_eq!(bus.output(id), bus.output(20));
                }
                prop_assert_eq!(group.commanded_speed(), speed);
            }
        }
    }
}
