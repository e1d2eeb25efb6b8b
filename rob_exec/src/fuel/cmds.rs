//! Fuel commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use super::{FuelOp, FuelSystem, FUEL_ID};
use crate::cmd::{Command, CommandExt, Finally, FnCommand};
use crate::constants::fuel::{LOW_POWER_SPIN_UP_DURATION, SPIN_UP_DURATION};
use crate::sched::SubsystemRef;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Power level of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPower {
    Full,

    /// Reduced voltages and a shorter spin up, for short range shots.
    Low,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl LaunchPower {
    fn spin_up_op(self) -> FuelOp {
        match self {
            LaunchPower::Full => FuelOp::SpinUp,
            LaunchPower::Low => FuelOp::LowPowerSpinUp,
        }
    }

    fn launch_op(self) -> FuelOp {
        match self {
            LaunchPower::Full => FuelOp::Launch,
            LaunchPower::Low => FuelOp::LowPowerLaunch,
        }
    }

    /// How long the launcher is spun up for before fuel is fed in.
    pub fn spin_up_duration(self) -> Duration {
        match self {
            LaunchPower::Full => SPIN_UP_DURATION,
            LaunchPower::Low => LOW_POWER_SPIN_UP_DURATION,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Command applying `op` every cycle, never finishing on its own.
///
/// The rollers are left running when the command ends.
pub fn run_op(fuel: &SubsystemRef<FuelSystem>, op: FuelOp) -> FnCommand {
    let fuel = fuel.clone();
    FnCommand::run(&format!("fuel_{:?}", op), &[FUEL_ID], move || {
        fuel.borrow_mut().apply(op)
    })
}

/// Command applying `op` every cycle, stopping the rollers when it ends.
pub fn run_op_then_stop(fuel: &SubsystemRef<FuelSystem>, op: FuelOp) -> FnCommand {
    let (f_run, f_end) = (fuel.clone(), fuel.clone());
    FnCommand::run_end(
        &format!("fuel_{:?}", op),
        &[FUEL_ID],
        move || f_run.borrow_mut().apply(op),
        move || f_end.borrow_mut().stop(),
    )
}

/// Command stopping the rollers, finishing straight away.
pub fn stop_command(fuel: &SubsystemRef<FuelSystem>) -> FnCommand {
    let fuel = fuel.clone();
    FnCommand::run_once("fuel_stop", &[FUEL_ID], move || fuel.borrow_mut().stop())
}

/// The launch sequence: spin up for the power level's spin up duration, then launch.
///
/// The launch runs until `launch_timeout` expires, or until the sequence is interrupted if there
/// is no timeout. The rollers are stopped however the sequence ends.
pub fn launch_sequence(
    fuel: &SubsystemRef<FuelSystem>,
    power: LaunchPower,
    launch_timeout: Option<Duration>,
) -> Finally {
    let spin_up = run_op(fuel, power.spin_up_op()).with_timeout(power.spin_up_duration());

    let launch = run_op(fuel, power.launch_op());
    let launch: Box<dyn Command> = match launch_timeout {
        Some(t) => launch.with_timeout(t).boxed(),
        None => launch.boxed(),
    };

    let fuel = fuel.clone();
    spin_up
        .and_then(launch)
        .finally_do(move |_| fuel.borrow_mut().stop())
}
