//! Logger set up for the executables
//!
//! Every line goes to stdout and to the session's log file, prefixed with the seconds elapsed since
//! the session started and a coloured level tag. Lines at debug and trace also carry the module
//! they came from.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules logging once per cycle or more, and the most verbose level kept for each.
const NOISY_MODULES: [(&str, LevelFilter); 2] = [
    ("comms_if::tunable", LevelFilter::Debug),
    ("rob_lib::drive", LevelFilter::Debug),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The executable must log at least at info level, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Cannot open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger is already installed: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the logger for this run of the executable, writing to stdout and the session log.
///
/// `min_level` is the most verbose level kept, it must be at least `Info`. The per-cycle drive
/// and tunable traces are capped at debug whatever `min_level` is.
///
/// Only one logger can be installed per process, a second call fails.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(message, record)))
        })
        .level(min_level);

    for (module, level) in NOISY_MODULES.iter() {
        dispatch = dispatch.level_for(*module, min_level.min(*level));
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn format_line(message: &Arguments, record: &Record) -> String {
    let elapsed_s = session::get_elapsed_seconds();
    let level = level_tag(record.level());

    if record.level() > Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed_s, level, record.target(), message)
    }
    else {
        format!("[{:10.6} {}] {}", elapsed_s, level, message)
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}
