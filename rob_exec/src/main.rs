//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The executable runs the robot software against simulated motor controllers, in the same order
//! as a match:
//!
//!     - Initialise the robot
//!     - Autonomous phase, running the autonomous program
//!     - Teleop phase, driven by an operator input script if one is given
//!     - Disable the robot
//!
//! Each phase is a loop of fixed period cycles, with every cycle:
//!     - Operator input acquisition
//!     - Robot processing (one scheduler tick)
//!     - Cycle management

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::Instant;

// Internal
use comms_if::tunable::{MemTunableStore, TunableStore};
use rob_lib::{
    op_input::OpInput,
    params::RobExecParams,
    robot::{Robot, RobotEqpt, RobotMode},
};
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingFrame, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of cycles between status reports in the log.
const STATUS_REPORT_INTERVAL_CYCLES: u64 = 50;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("rob_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Fuel Bot Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params =
        RobExecParams::load("rob_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    let mut input_source = OpInputSource::Neutral;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} frames\n",
            si.get_duration(),
            si.get_num_frames()
        );

        input_source = OpInputSource::Script(si);
    }
    else if args.len() == 1 {
        info!("No script provided, teleop will run with a neutral controller\n");
    }
    else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE ROBOT ----

    info!("Initialising robot...");

    let tunables = Rc::new(MemTunableStore::new());
    let op_input = Rc::new(OpInput::new());

    let mut robot = Robot::new(
        RobotEqpt::simulated(),
        tunables.clone(),
        op_input.clone(),
        params.cycle_period(),
    )
    .wrap_err("Failed to initialise the robot")?;

    for (key, value) in params.tunable_overrides.iter() {
        info!("Overriding tunable \"{}\" = {}", key, value);
        tunables.put_number(key, *value);
    }

    info!("Robot initialisation complete\n");

    // ---- AUTONOMOUS ----

    robot.set_mode(RobotMode::Autonomous);
    run_phase(
        &mut robot,
        &params,
        params.num_cycles(params.auto_duration_s),
        |_| true,
    );

    if robot.auto_running() {
        warn!("Autonomous program still running at the end of the phase");
    }

    // ---- TELEOP ----

    robot.set_mode(RobotMode::Teleop);
    run_phase(
        &mut robot,
        &params,
        params.num_cycles(params.teleop_duration_s),
        |time_s| match input_source {
            OpInputSource::Neutral => true,
            OpInputSource::Script(ref mut si) => match si.get_pending_frame(time_s) {
                PendingFrame::None => true,
                PendingFrame::Some(frame) => {
                    op_input.set_frame(frame);
                    true
                }
                PendingFrame::EndOfScript => {
                    info!("End of input script reached, ending teleop");
                    false
                }
            },
        },
    );

    // ---- SHUTDOWN ----

    robot.set_mode(RobotMode::Disabled);

    match serde_json::to_string_pretty(&tunables.snapshot()) {
        Ok(s) => info!("Final tunable values:\n{}", s),
        Err(e) => warn!("Could not serialise the tunable values: {}", e),
    }

    info!("End of execution");

    Ok(())
}

/// Run the robot for `num_cycles` cycles, or until `acquire_input` returns false.
///
/// `acquire_input` is called at the start of every cycle with the time since the start of the
/// phase, in seconds.
fn run_phase<F>(robot: &mut Robot, params: &RobExecParams, num_cycles: u64, mut acquire_input: F)
where
    F: FnMut(f64) -> bool,
{
    info!("Begining {:?} phase\n", robot.mode());

    let cycle_period = params.cycle_period();

    for cycle in 0..num_cycles {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- INPUT ACQUISITION ----

        if !acquire_input(cycle as f64 * params.cycle_period_s) {
            break;
        }

        // ---- ROBOT PROCESSING ----

        robot.tick();

        if cycle % STATUS_REPORT_INTERVAL_CYCLES == 0 {
            match serde_json::to_string(&robot.report()) {
                Ok(s) => info!("Status: {}", s),
                Err(e) => warn!("Could not serialise the status report: {}", e),
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Sources of operator input for the teleop phase.
enum OpInputSource {
    /// No operator, every axis centred and every button released.
    Neutral,

    Script(ScriptInterpreter),
}
