//! Sessions
//!
//! A session is one run of an executable, for the robot executable one simulated match. The
//! session's start time is the epoch every log line's timestamp counts from, and the session gets
//! its own directory under the software root to hold the log file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Format of the timestamp in session directory names, sortable by start time.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Where the current session's files live.
#[derive(Clone, Debug)]
pub struct Session {
    pub session_root: PathBuf,
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(
        "Sessions are stored under the software root, set {} to the Fuel Bot software directory",
        crate::host::SW_ROOT_ENV_VAR
    )]
    SwRootNotSet,

    #[error("Cannot create the session directory {0:?}: {1}")]
    CannotCreateDir(PathBuf, std::io::Error),

    #[error("Only one session can be started per run ({0})")]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("No session has been started")]
    CannotGetEpoch,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session, setting the epoch to now.
    ///
    /// Creates `<sw root>/<sessions_dir>/<exec_name>_<timestamp>/`, the log file will be
    /// `<exec_name>.log` inside it.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::CannotInitEpoch)?;
        let epoch = get_epoch()?;

        let mut sessions_root =
            crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;
        sessions_root.push(sessions_dir);

        let session = Self::in_dir(sessions_root, exec_name, epoch);
        fs::create_dir_all(&session.session_root)
            .map_err(|e| SessionError::CannotCreateDir(session.session_root.clone(), e))?;

        Ok(session)
    }

    fn in_dir(sessions_root: PathBuf, exec_name: &str, epoch: &DateTime<Utc>) -> Self {
        let session_root =
            sessions_root.join(format!("{}_{}", exec_name, epoch.format(TIMESTAMP_FORMAT)));
        let log_file_path = session_root.join(format!("{}.log", exec_name));

        Self {
            session_root,
            log_file_path,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds since the session started, `NAN` before it has.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => time::duration_to_seconds(Utc::now() - *e).unwrap_or(std::f64::NAN),
        None => std::f64::NAN,
    }
}

pub fn get_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    SESSION_EPOCH.get().ok_or(SessionError::CannotGetEpoch)
}
