//! # Motor Actuator Interface
//!
//! Motor controllers are driven open-loop, either by a voltage demand or a duty cycle demand. The
//! controller firmware (and whatever bus it sits on) is outside of this software, all the robot
//! sees is the [`MotorActuator`] trait.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capability of a single motor controller.
///
/// Demands (`set_*`, `stop`) cannot fail from the robot's point of view, stall and disconnection
/// handling is done by the controller's own current limiting. Configuration can be rejected by the
/// controller, in which case a [`MotorError`] is returned.
pub trait MotorActuator {
    /// The bus ID of the controller.
    fn id(&self) -> MotorId;

    /// Demand a voltage across the motor terminals.
    ///
    /// Units: volts
    fn set_voltage(&mut self, volts: f64);

    /// Demand a duty cycle between -1.0 and +1.0.
    fn set_output(&mut self, duty: f64);

    /// Remove any demand, leaving the motor in its configured neutral mode.
    fn stop(&mut self);

    /// Set the supply current limit of the controller.
    ///
    /// Units: amps
    fn configure_current_limit(&mut self, amps: u32) -> Result<(), MotorError>;

    /// Set the behaviour of the motor when no output is demanded.
    fn configure_neutral_mode(&mut self, mode: NeutralMode) -> Result<(), MotorError>;

    /// Invert the direction of the motor, so that positive demands drive it backwards.
    fn configure_inversion(&mut self, inverted: bool) -> Result<(), MotorError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// ID of a motor controller on the robot's bus.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotorId(pub u8);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Behaviour of a motor when no output is demanded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutralMode {
    /// Motor terminals left open, the mechanism spins down freely.
    Coast,

    /// Motor terminals shorted, the mechanism is actively slowed.
    Brake,
}

/// Errors a motor controller can report while being configured.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotorError {
    #[error("Motor controller {0:?} rejected the configuration: {1}")]
    ConfigRejected(MotorId, String),
}
