//! # Fuel subsystem
//!
//! The fuel mechanism has two rollers: the feeder, which moves fuel towards the launch point, and
//! the launcher, which both intakes fuel and launches it. Every operation is a pair of roller
//! voltages read from the tunable store each time the operation is applied.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmds;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::Serialize;
use std::ops::Neg;
use std::rc::Rc;

use comms_if::{eqpt::motor::MotorActuator, tunable::TunableStore};

use crate::cmd::SubsystemId;
use crate::constants::{fuel::*, TunableValue};
use crate::sched::{Subsystem, SubsystemInitError};
pub use cmds::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const FUEL_ID: SubsystemId = SubsystemId("fuel");

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The fuel subsystem.
pub struct FuelSystem {
    feeder: Box<dyn MotorActuator>,
    launcher: Box<dyn MotorActuator>,
    tunables: Rc<dyn TunableStore>,
    current_op: Option<FuelOp>,
}

/// Voltages for the two rollers.
///
/// Units: volts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltagePair {
    pub feeder: f64,
    pub launcher: f64,
}

/// Status of the fuel subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelStatusReport {
    /// The operation last applied, `None` if the rollers are stopped.
    pub op: Option<FuelOp>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Operations the fuel mechanism can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuelOp {
    /// Draw fuel in through the launcher.
    Intake,

    /// Intake at reduced power, for picking fuel up from the hopper.
    HopperIntake,

    /// Push fuel back out through the intake, the reverse of `Intake`.
    Eject,

    /// Bring the launcher up to speed while holding fuel back with the feeder.
    SpinUp,

    /// Feed fuel into the spinning launcher.
    Launch,

    LowPowerSpinUp,

    LowPowerLaunch,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Neg for VoltagePair {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            feeder: -self.feeder,
            launcher: -self.launcher,
        }
    }
}

impl VoltagePair {
    fn scaled(self, factor: f64) -> Self {
        Self {
            feeder: self.feeder * factor,
            launcher: self.launcher * factor,
        }
    }
}

impl FuelSystem {
    /// Create and configure the fuel subsystem.
    ///
    /// The launcher is inverted, and every tunable roller value is published to the store with its
    /// compiled default.
    pub fn new(
        mut feeder: Box<dyn MotorActuator>,
        mut launcher: Box<dyn MotorActuator>,
        tunables: Rc<dyn TunableStore>,
    ) -> Result<Self, SubsystemInitError> {
        let config_err = |e| SubsystemInitError::MotorConfig(FUEL_ID, e);

        feeder
            .configure_current_limit(FEEDER_CURRENT_LIMIT_A)
            .map_err(config_err)?;
        launcher.configure_inversion(true).map_err(config_err)?;
        launcher
            .configure_current_limit(LAUNCHER_CURRENT_LIMIT_A)
            .map_err(config_err)?;

        for t in ALL_TUNABLES.iter() {
            t.publish_default(tunables.as_ref());
        }

        info!("Fuel system initialised");

        Ok(Self {
            feeder,
            launcher,
            tunables,
            current_op: None,
        })
    }

    /// The voltages `op` would apply, using the current tunable values.
    pub fn voltages(&self, op: FuelOp) -> VoltagePair {
        let store = self.tunables.as_ref();
        let pair = |feeder: &TunableValue, launcher: &TunableValue| VoltagePair {
            feeder: feeder.read(store),
            launcher: launcher.read(store),
        };

        match op {
            FuelOp::Intake => pair(&INTAKING_FEEDER, &INTAKING_INTAKE),
            FuelOp::HopperIntake => {
                pair(&INTAKING_FEEDER, &INTAKING_INTAKE).scaled(HOPPER_INTAKE_FRACTION)
            }
            FuelOp::Eject => -pair(&INTAKING_FEEDER, &INTAKING_INTAKE),
            FuelOp::SpinUp => pair(&SPIN_UP_FEEDER, &LAUNCHING_LAUNCHER),
            FuelOp::Launch => pair(&LAUNCHING_FEEDER, &LAUNCHING_LAUNCHER),
            FuelOp::LowPowerSpinUp => {
                pair(&LOW_POWER_SPIN_UP_FEEDER, &LOW_POWER_LAUNCHING_LAUNCHER)
            }
            FuelOp::LowPowerLaunch => {
                pair(&LOW_POWER_LAUNCHING_FEEDER, &LOW_POWER_LAUNCHING_LAUNCHER)
            }
        }
    }

    /// Drive the rollers for an operation.
    pub fn apply(&mut self, op: FuelOp) {
        let v = self.voltages(op);
        self.feeder.set_voltage(v.feeder);
        self.launcher.set_voltage(v.launcher);
        self.current_op = Some(op);
    }

    pub fn intake(&mut self) {
        self.apply(FuelOp::Intake)
    }

    pub fn hopper_intake(&mut self) {
        self.apply(FuelOp::HopperIntake)
    }

    pub fn eject(&mut self) {
        self.apply(FuelOp::Eject)
    }

    pub fn spin_up(&mut self) {
        self.apply(FuelOp::SpinUp)
    }

    pub fn launch(&mut self) {
        self.apply(FuelOp::Launch)
    }

    pub fn low_power_spin_up(&mut self) {
        self.apply(FuelOp::LowPowerSpinUp)
    }

    pub fn low_power_launch(&mut self) {
        self.apply(FuelOp::LowPowerLaunch)
    }

    /// Stop both rollers, leaving them to idle.
    pub fn stop(&mut self) {
        self.feeder.set_output(0.0);
        self.launcher.set_output(0.0);
        self.current_op = None;
    }

    pub fn report(&self) -> FuelStatusReport {
        FuelStatusReport {
            op: self.current_op,
        }
    }
}

impl Subsystem for FuelSystem {
    fn id(&self) -> SubsystemId {
        FUEL_ID
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::sim_eqpt::{SimMotor, SimMotorProbe};
    use comms_if::eqpt::motor::MotorError;
    use comms_if::tunable::MemTunableStore;
    use std::cell::RefCell;

    pub(crate) fn sim_fuel(
        store: Rc<MemTunableStore>,
    ) -> (Rc<RefCell<FuelSystem>>, SimMotorProbe, SimMotorProbe) {
        let feeder = SimMotor::new(FEEDER_ID).recording();
        let launcher = SimMotor::new(LAUNCHER_ID).recording();
        let (feeder_probe, launcher_probe) = (feeder.probe(), launcher.probe());

        let fuel = FuelSystem::new(Box::new(feeder), Box::new(launcher), store).unwrap();

        (Rc::new(RefCell::new(fuel)), feeder_probe, launcher_probe)
    }

    #[test]
    fn test_construction() {
        let store = Rc::new(MemTunableStore::new());
        let (_, feeder, launcher) = sim_fuel(store.clone());

        assert!(launcher.borrow().inverted);
        assert!(!feeder.borrow().inverted);
        assert_eq!(feeder.borrow().current_limit_a, Some(FEEDER_CURRENT_LIMIT_A));
        assert_eq!(launcher.borrow().current_limit_a, Some(LAUNCHER_CURRENT_LIMIT_A));

        let published = store.snapshot();
        for t in ALL_TUNABLES.iter() {
            assert_eq!(published.get(t.key), Some(&t.default));
        }
    }

    #[test]
    fn test_rejected_config_is_fatal() {
        let result = FuelSystem::new(
            Box::new(SimMotor::new(FEEDER_ID)),
            Box::new(SimMotor::new(LAUNCHER_ID).rejecting_config()),
            Rc::new(MemTunableStore::new()),
        );

        assert!(matches!(
            result,
            Err(SubsystemInitError::MotorConfig(
                FUEL_ID,
                MotorError::ConfigRejected(LAUNCHER_ID, _)
            ))
        ));
    }

    #[test]
    fn test_eject_is_negated_intake() {
        let store = Rc::new(MemTunableStore::new());
        let (fuel, _, _) = sim_fuel(store.clone());

        for (feeder, intake) in [(5.0, 6.0), (-5.0, 6.0), (0.0, 3.5), (2.25, -12.0)].iter() {
            store.put_number(INTAKING_FEEDER.key, *feeder);
            store.put_number(INTAKING_INTAKE.key, *intake);

            let fuel = fuel.borrow();
            assert_eq!(fuel.voltages(FuelOp::Eject), -fuel.voltages(FuelOp::Intake));
        }
    }

    #[test]
    fn test_default_voltages() {
        let (fuel, feeder, launcher) = sim_fuel(Rc::new(MemTunableStore::new()));
        let mut fuel = fuel.borrow_mut();

        let cases = [
            (FuelOp::Intake, 5.0, 6.0),
            (FuelOp::HopperIntake, 2.5, 3.0),
            (FuelOp::Eject, -5.0, -6.0),
            (FuelOp::SpinUp, -10.0, 12.0),
            (FuelOp::Launch, 11.0, 12.0),
            (FuelOp::LowPowerSpinUp, -9.0, 11.0),
            (FuelOp::LowPowerLaunch, 10.0, 11.0),
        ];

        for (op, f, l) in cases.iter() {
            fuel.apply(*op);
            assert_eq!(feeder.borrow().voltage(), Some(*f), "{:?}", op);
            assert_eq!(launcher.borrow().voltage(), Some(*l), "{:?}", op);
            assert_eq!(fuel.report().op, Some(*op));
        }

        fuel.stop();
        assert_eq!(feeder.borrow().output(), Some(0.0));
        assert_eq!(launcher.borrow().output(), Some(0.0));
        assert_eq!(fuel.report().op, None);
    }

    #[test]
    fn test_tunables_read_live() {
        let store = Rc::new(MemTunableStore::new());
        let (fuel, feeder, _) = sim_fuel(store.clone());

        fuel.borrow_mut().launch();
        store.put_number(LAUNCHING_FEEDER.key, 9.0);
        fuel.borrow_mut().launch();

        assert_eq!(feeder.borrow().voltage(), Some(9.0));
    }
}
