//! # Operator input script interpreter module
//!
//! This module provides an interpreter for operator input scripts, allowing
//! the robot to be driven without a controller attached.
//!
//! A script is a list of timestamped input frames, one per statement:
//!
//! ```text
//! 0.0: {"axes": {"LeftY": -0.8}};
//! 2.5: {"buttons": ["R1"]};
//! 5.0: {};
//! ```
//!
//! Each frame replaces the previous one in full, so a button is held from the
//! frame that lists it until the next frame that doesn't.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::eqpt::input::InputFrame;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A frame which is scripted to be applied at a specific time.
struct ScriptedFrame {
    /// The time the frame is supposed to be applied at
    apply_time_s: f64,

    frame: InputFrame
}

/// A script interpreter.
///
/// After initialising with the script to run use `.get_pending_frame` to
/// acquire the input frame that should be applied now.
pub struct ScriptInterpreter {
    frames: VecDeque<ScriptedFrame>,
    duration_s: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid input frame at {0} s: {1}")]
    InvalidFrame(f64, serde_json::Error),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    OutOfOrder(f64, f64)
}

#[derive(Debug, PartialEq)]
pub enum PendingFrame {
    /// No new frame, keep applying the current one.
    None,

    /// The newest frame whose time has been reached.
    Some(InputFrame),

    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::from_script(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {

        let mut frames: VecDeque<ScriptedFrame> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let apply_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = frames.back() {
                if apply_time_s < last.apply_time_s {
                    return Err(ScriptError::OutOfOrder(last.apply_time_s, apply_time_s));
                }
            }

            let frame: InputFrame = serde_json::from_str(&cap[3])
                .map_err(|e| ScriptError::InvalidFrame(apply_time_s, e))?;

            frames.push_back(ScriptedFrame {
                apply_time_s,
                frame
            });
        }

        let duration_s = match frames.back() {
            Some(f) => f.apply_time_s,
            None => return Err(ScriptError::ScriptEmpty)
        };

        Ok(ScriptInterpreter {
            frames,
            duration_s
        })
    }

    /// Return the frame to apply at `current_time_s`, seconds since the
    /// start of the script.
    ///
    /// If several frames have become due since the last call only the newest
    /// one is returned, the older ones would have been overwritten anyway.
    pub fn get_pending_frame(&mut self, current_time_s: f64) -> PendingFrame {

        if self.frames.is_empty() {
            return PendingFrame::EndOfScript
        }

        let mut newest = None;

        while let Some(f) = self.frames.front() {
            if f.apply_time_s > current_time_s {
                break;
            }
            newest = self.frames.pop_front().map(|f| f.frame);
        }

        match newest {
            Some(f) => PendingFrame::Some(f),
            None => PendingFrame::None
        }
    }

    /// Get the number of frames remaining in the script
    pub fn get_num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.duration_s
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::input::{ButtonId, InputSource};

    const SCRIPT: &str = r#"
        0.0: {"axes": {"LeftY": -0.8}};
        1.0: {"buttons": ["R1"]};
        1.5: {"buttons": ["R1", "L1"]};
        3.0: {};
    "#;

    #[test]
    fn test_pending_frames() {
        let mut si = ScriptInterpreter::from_script(SCRIPT).unwrap();

        assert_eq!(si.get_num_frames(), 4);
        assert_eq!(si.get_duration(), 3.0);

        match si.get_pending_frame(0.0) {
            PendingFrame::Some(f) => assert!(f.buttons.is_empty()),
            p => panic!("Expected the first frame, got {:?}", p),
        }

        assert_eq!(si.get_pending_frame(0.5), PendingFrame::None);

        // Both 1.0 and 1.5 are due, only the newest is returned
        match si.get_pending_frame(2.0) {
            PendingFrame::Some(f) => {
                assert!(f.button(ButtonId::R1));
                assert!(f.button(ButtonId::L1));
            }
            p => panic!("Expected the 1.5 s frame, got {:?}", p),
        }

        assert_eq!(si.get_pending_frame(3.0), PendingFrame::Some(InputFrame::default()));
        assert_eq!(si.get_pending_frame(4.0), PendingFrame::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_script("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script("1.0: {\"buttons\": [\"Jump\"]};"),
            Err(ScriptError::InvalidFrame(t, _)) if t == 1.0
        ));
        assert!(matches!(
            ScriptInterpreter::from_script("2.0: {};\n1.0: {};"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
    }
}
