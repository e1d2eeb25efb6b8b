//! # Communications interface crate.
//!
//! Provides the interfaces between the robot software and the collaborators it does not own: the
//! actuator drivers, the operator's input device and the tunable value store.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Interfaces to equipment (motor controllers and operator input devices)
pub mod eqpt;

/// Runtime-editable key/value store
pub mod tunable;
