//! # Robot constants
//!
//! Every compiled value the robot needs, grouped by the part of the robot that uses it. Values
//! marked as [`TunableValue`] are only defaults, the live value is read from the tunable store.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tunable::TunableStore;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A value which may be overriden at runtime through the tunable store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunableValue {
    pub key: &'static str,
    pub default: f64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl TunableValue {
    pub const fn new(key: &'static str, default: f64) -> Self {
        Self { key, default }
    }

    /// Read the current value, falling back to the compiled default.
    pub fn read(&self, store: &dyn TunableStore) -> f64 {
        store.get_number(self.key, self.default)
    }

    /// Publish the compiled default so it can be seen and edited.
    pub fn publish_default(&self, store: &dyn TunableStore) {
        store.put_number(self.key, self.default)
    }
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Scheduler timing
pub mod sched {
    use std::time::Duration;

    /// Nominal period of one scheduler cycle.
    pub const CYCLE_PERIOD: Duration = Duration::from_millis(20);
}

/// Drivetrain constants
pub mod drive {
    use comms_if::eqpt::motor::MotorId;

    pub const LEFT_LEADER_ID: MotorId = MotorId(21);
    pub const LEFT_FOLLOWER_ID: MotorId = MotorId(11);
    pub const RIGHT_LEADER_ID: MotorId = MotorId(22);
    pub const RIGHT_FOLLOWER_ID: MotorId = MotorId(12);

    /// Current limit of every drive motor.
    ///
    /// Units: amps
    pub const MOTOR_CURRENT_LIMIT_A: u32 = 60;

    /// Power scaling of the right side, compensating for the right gearbox being stronger than the
    /// left. Must be in (0, 1].
    pub const RIGHT_SIDE_SCALING: f64 = 0.9;

    /// Speed inputs with a magnitude below this are treated as zero.
    pub const DEADZONE: f64 = 0.05;

    pub const LEFT_OUTPUT_KEY: &str = "Drive/Left Output";
    pub const RIGHT_OUTPUT_KEY: &str = "Drive/Right Output";
}

/// Fuel mechanism constants
pub mod fuel {
    use super::TunableValue;
    use comms_if::eqpt::motor::MotorId;
    use std::time::Duration;

    pub const FEEDER_ID: MotorId = MotorId(6);
    pub const LAUNCHER_ID: MotorId = MotorId(5);

    /// Units: amps
    pub const FEEDER_CURRENT_LIMIT_A: u32 = 60;

    /// Units: amps
    pub const LAUNCHER_CURRENT_LIMIT_A: u32 = 60;

    // All roller values are in volts.

    pub const INTAKING_FEEDER: TunableValue =
        TunableValue::new("Fuel/Intaking feeder roller value", 5.0);
    pub const INTAKING_INTAKE: TunableValue =
        TunableValue::new("Fuel/Intaking intake roller value", 6.0);

    pub const LAUNCHING_FEEDER: TunableValue =
        TunableValue::new("Fuel/Launching feeder roller value", 11.0);
    pub const LAUNCHING_LAUNCHER: TunableValue =
        TunableValue::new("Fuel/Launching launcher roller value", 12.0);
    pub const SPIN_UP_FEEDER: TunableValue =
        TunableValue::new("Fuel/Spin-up feeder roller value", -10.0);

    pub const LOW_POWER_LAUNCHING_FEEDER: TunableValue =
        TunableValue::new("Fuel/Low Power Launching feeder roller value", 10.0);
    pub const LOW_POWER_LAUNCHING_LAUNCHER: TunableValue =
        TunableValue::new("Fuel/Low Power Launching launcher roller value", 11.0);
    pub const LOW_POWER_SPIN_UP_FEEDER: TunableValue =
        TunableValue::new("Fuel/Low Power Spin-up feeder roller value", -9.0);

    /// Every tunable roller value, published at start up.
    pub const ALL_TUNABLES: [TunableValue; 8] = [
        INTAKING_FEEDER,
        INTAKING_INTAKE,
        LAUNCHING_FEEDER,
        LAUNCHING_LAUNCHER,
        SPIN_UP_FEEDER,
        LOW_POWER_LAUNCHING_FEEDER,
        LOW_POWER_LAUNCHING_LAUNCHER,
        LOW_POWER_SPIN_UP_FEEDER,
    ];

    /// Hopper intake runs at this fraction of the intake voltages.
    pub const HOPPER_INTAKE_FRACTION: f64 = 0.5;

    pub const SPIN_UP_DURATION: Duration = Duration::from_secs(1);
    pub const LOW_POWER_SPIN_UP_DURATION: Duration = Duration::from_millis(500);
}

/// Operator control constants
pub mod driver {
    /// Multiplier applied to the forward stick, to keep the robot controllable.
    pub const DRIVE_SCALING: f64 = 0.9;

    /// Multiplier applied to the rotation stick.
    pub const ROTATION_SCALING: f64 = 0.8;

    /// The low power launch is held while the R2 trigger is further in than this.
    pub const LOW_POWER_TRIGGER_THRESHOLD: f64 = 0.5;
}

/// Autonomous program constants
pub mod auto {
    use std::time::Duration;

    /// Forward speed of the drive away from the wall.
    pub const DRIVE_SPEED: f64 = 0.5;

    pub const DRIVE_DURATION: Duration = Duration::from_millis(250);

    pub const LAUNCH_DURATION: Duration = Duration::from_secs(9);
}
