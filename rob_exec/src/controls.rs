//! # Operator controls
//!
//! Binds the operator's controller to the robot's commands:
//!
//! | Input         | While held                                          |
//! |---------------|-----------------------------------------------------|
//! | L1            | Intake                                              |
//! | Square        | Hopper intake                                       |
//! | R1            | Spin up then launch                                 |
//! | R2 past half  | Low power spin up then launch                       |
//! | Cross         | Eject                                               |
//!
//! The left stick's Y axis and the right stick's X axis drive the robot whenever nothing else is
//! using the drivetrain.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use comms_if::eqpt::input::{AxisId, ButtonId, InputSource};

use crate::cmd::CommandExt;
use crate::constants::driver::*;
use crate::drive::{self, Drivetrain, DRIVE_ID};
use crate::fuel::{launch_sequence, run_op_then_stop, FuelOp, FuelSystem, LaunchPower};
use crate::sched::{Binding, SchedError, Scheduler, SubsystemRef, Trigger};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Bind the controls and set the drivetrain's default command.
pub fn bind_operator_controls(
    sched: &mut Scheduler,
    input: Rc<dyn InputSource>,
    drive: &SubsystemRef<Drivetrain>,
    fuel: &SubsystemRef<FuelSystem>,
) -> Result<(), SchedError> {
    // Pushing the left stick away gives a negative Y, which should drive forwards. The right
    // stick is negated the same way.
    let (fwd_input, rot_input) = (input.clone(), input.clone());
    sched.set_default_command(
        DRIVE_ID,
        drive::drive_arcade(
            drive,
            move || -fwd_input.axis(AxisId::LeftY) * DRIVE_SCALING,
            move || -rot_input.axis(AxisId::RightX) * ROTATION_SCALING,
        )
        .boxed(),
    )?;

    let ops = [
        (ButtonId::L1, FuelOp::Intake),
        (ButtonId::Square, FuelOp::HopperIntake),
        (ButtonId::Cross, FuelOp::Eject),
    ];
    for (button, op) in ops.iter().copied() {
        let fuel = fuel.clone();
        sched.add_binding(Binding::while_true(
            Trigger::button(input.clone(), button),
            move || Ok(run_op_then_stop(&fuel, op).boxed()),
        ));
    }

    let f = fuel.clone();
    sched.add_binding(Binding::while_true(
        Trigger::button(input.clone(), ButtonId::R1),
        move || Ok(launch_sequence(&f, LaunchPower::Full, None).boxed()),
    ));

    let f = fuel.clone();
    sched.add_binding(Binding::while_true(
        Trigger::axis_above(input, AxisId::R2, LOW_POWER_TRIGGER_THRESHOLD),
        move || Ok(launch_sequence(&f, LaunchPower::Low, None).boxed()),
    ));

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::sched::CYCLE_PERIOD;
    use crate::op_input::OpInput;
    use crate::robot::test::sim_robot_parts;
    use comms_if::eqpt::input::InputFrame;

    fn frame(buttons: &[ButtonId], axes: &[(AxisId, f64)]) -> InputFrame {
        InputFrame {
            axes: axes.iter().copied().collect(),
            buttons: buttons.iter().copied().collect(),
        }
    }

    #[test]
    fn test_controls() {
        let parts = sim_robot_parts();
        let input = Rc::new(OpInput::new());
        let mut sched = Scheduler::new(CYCLE_PERIOD);
        sched.register_subsystem(parts.drive.clone()).unwrap();
        sched.register_subsystem(parts.fuel.clone()).unwrap();

        bind_operator_controls(&mut sched, input.clone(), &parts.drive, &parts.fuel).unwrap();

        // Stick forward drives forward, scaled
        input.set_frame(frame(&[], &[(AxisId::LeftY, -1.0)]));
        sched.tick();
        assert_eq!(parts.left_leader.borrow().output(), Some(0.9));

        // Hold L1 to intake, release to stop
        input.set_frame(frame(&[ButtonId::L1], &[]));
        sched.tick();
        assert_eq!(parts.feeder.borrow().voltage(), Some(5.0));
        assert_eq!(parts.launcher.borrow().voltage(), Some(6.0));
        input.clear();
        sched.tick();
        assert_eq!(parts.feeder.borrow().output(), Some(0.0));
        assert_eq!(sched.holder_of(crate::fuel::FUEL_ID), None);

        // Hold R1 through spin up and into the launch
        input.set_frame(frame(&[ButtonId::R1], &[]));
        for _ in 0..51 {
            sched.tick();
        }
        assert_eq!(parts.feeder.borrow().voltage(), Some(11.0));
        input.clear();
        sched.tick();
        assert_eq!(parts.feeder.borrow().output(), Some(0.0));

        // R2 past the threshold gives the low power spin up
        input.set_frame(frame(&[], &[(AxisId::R2, 0.6)]));
        sched.tick();
        assert_eq!(parts.feeder.borrow().voltage(), Some(-9.0));
        input.set_frame(frame(&[], &[(AxisId::R2, 0.4)]));
        sched.tick();
        assert_eq!(parts.feeder.borrow().output(), Some(0.0));

        // Driving carries on while the fuel system is busy
        input.set_frame(frame(&[ButtonId::Cross], &[(AxisId::RightX, 1.0)]));
        sched.tick();
        assert_eq!(parts.feeder.borrow().voltage(), Some(-5.0));
        assert_eq!(parts.left_leader.borrow().output(), Some(0.8));
    }
}
