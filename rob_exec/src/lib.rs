//! # Robot library.
//!
//! The robot's command scheduling runtime and its subsystems. The executable in `main.rs` runs it
//! against simulated equipment, the library itself only talks to hardware through the interfaces
//! in `comms_if`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomous programs - commands run without the operator
pub mod autos;

/// Commands - the command trait, closure commands and compositions
pub mod cmd;

/// Compiled constants - motor IDs, limits and tunable roller values
pub mod constants;

/// Operator controls - bindings from the controller to commands
pub mod controls;

/// Drivetrain subsystem - arcade drive on a differential drivetrain
pub mod drive;

/// Fuel subsystem - intake, eject and the launch sequence
pub mod fuel;

/// Operator input - the latest frame from the operator's controller
pub mod op_input;

/// Executable parameters
pub mod params;

/// Robot - owns the scheduler and subsystems and handles mode changes
pub mod robot;

/// Scheduler - runs commands and resolves subsystem claims
pub mod sched;

/// Simulated equipment - motor controllers for the desktop executable and tests
pub mod sim_eqpt;
