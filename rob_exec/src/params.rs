//! # Robot Executable Parameters
//!
//! Parameters of the desktop executable, loaded from `params/rob_exec.toml`. The robot's own
//! constants are compiled, see [`crate::constants`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use util::params::LoadError;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// How long the autonomous program is given before teleop starts.
    ///
    /// Units: seconds
    pub auto_duration_s: f64,

    /// How long teleop lasts. The phase also ends when the input script runs out.
    ///
    /// Units: seconds
    pub teleop_duration_s: f64,

    /// Values pushed into the tunable store once the robot is built, replacing the compiled
    /// defaults.
    #[serde(default)]
    pub tunable_overrides: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RobExecParamsError {
    #[error(transparent)]
    LoadError(#[from] LoadError),

    #[error("The cycle period must be a positive number of seconds, found {0}")]
    InvalidCyclePeriod(f64),

    #[error("The {0} duration must be a finite, non-negative number of seconds, found {1}")]
    InvalidPhaseDuration(&'static str, f64),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl RobExecParams {
    /// Load and check the parameters from a file in the params directory.
    pub fn load(param_file_path: &str) -> Result<Self, RobExecParamsError> {
        let params: Self = util::params::load(param_file_path)?;
        params.validate()?;
        Ok(params)
    }

    /// Check the values are usable by the executable.
    pub fn validate(&self) -> Result<(), RobExecParamsError> {
        if !self.cycle_period_s.is_finite() || self.cycle_period_s <= 0.0 {
            return Err(RobExecParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        let phases = [
            ("autonomous", self.auto_duration_s),
            ("teleop", self.teleop_duration_s),
        ];
        for (phase, duration_s) in phases.iter() {
            if !duration_s.is_finite() || *duration_s < 0.0 {
                return Err(RobExecParamsError::InvalidPhaseDuration(*phase, *duration_s));
            }
        }

        Ok(())
    }

    /// The cycle period. The parameters must have been validated.
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(self.cycle_period_s)
    }

    /// Number of whole cycles in a phase lasting `duration_s`.
    pub fn num_cycles(&self, duration_s: f64) -> u64 {
        (duration_s / self.cycle_period_s).round() as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let params: RobExecParams = util::params::parse(
            r#"
            cycle_period_s = 0.02
            auto_duration_s = 15.0
            teleop_duration_s = 135.0

            [tunable_overrides]
            "Fuel/Launching feeder roller value" = 10.5
            "#,
        )
        .unwrap();

        assert_eq!(params.cycle_period(), Duration::from_millis(20));
        assert_eq!(params.num_cycles(params.auto_duration_s), 750);
        assert_eq!(
            params.tunable_overrides.get("Fuel/Launching feeder roller value"),
            Some(&10.5)
        );

        let params: RobExecParams = util::params::parse(
            "cycle_period_s = 0.02\nauto_duration_s = 1.0\nteleop_duration_s = 2.0",
        )
        .unwrap();
        assert!(params.tunable_overrides.is_empty());
    }

    #[test]
    fn test_invalid_periods_rejected() {
        let params = |cycle_period_s: f64, auto_duration_s: f64| RobExecParams {
            cycle_period_s,
            auto_duration_s,
            teleop_duration_s: 2.0,
            tunable_overrides: BTreeMap::new(),
        };

        assert!(params(0.02, 15.0).validate().is_ok());
        assert!(params(0.02, 0.0).validate().is_ok());

        for period in [-0.02, 0.0, f64::NAN, f64::INFINITY].iter() {
            assert!(
                matches!(
                    params(*period, 15.0).validate(),
                    Err(RobExecParamsError::InvalidCyclePeriod(_))
                ),
                "{}",
                period
            );
        }

        assert!(matches!(
            params(0.02, -1.0).validate(),
            Err(RobExecParamsError::InvalidPhaseDuration("autonomous", _))
        ));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result: Result<RobExecParams, LoadError> =
            util::params::load_from_path("does/not/exist.toml");
        assert!(matches!(
            result.map_err(RobExecParamsError::from),
            Err(RobExecParamsError::LoadError(_))
        ));
    }
}
