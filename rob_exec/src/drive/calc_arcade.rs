//! Arcade drive mixing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use util::maths::{apply_deadzone, clamp};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Parameters of the arcade mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcadeParams {
    /// Speed inputs with a magnitude below this are treated as zero.
    pub deadzone: f64,

    /// Multiplier applied to the mixed right side output, in (0, 1].
    pub right_side_scaling: f64,
}

/// Duty cycle demands for each side of the drivetrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ArcadeOutput {
    pub left: f64,
    pub right: f64,

    /// True if the left mix was outside [-1, 1] and has been clamped.
    pub left_limited: bool,

    /// True if the right mix was outside [-1, 1] and has been clamped.
    pub right_limited: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Mix a forward and rotation speed, both in [-1, 1], into left and right side demands.
///
/// Positive rotation slows the left side and speeds up the right. The sides are clamped
/// independently, so in a hard turn one side may saturate while the other does not.
pub fn calc_arcade(forward: f64, rotation: f64, params: &ArcadeParams) -> ArcadeOutput {
    let forward = apply_deadzone(forward, params.deadzone);
    let rotation = apply_deadzone(rotation, params.deadzone);

    let left = forward - rotation;
    let right = (forward + rotation) * params.right_side_scaling;

    ArcadeOutput {
        left: clamp(left, -1.0, 1.0),
        right: clamp(right, -1.0, 1.0),
        left_limited: left.abs() > 1.0,
        right_limited: right.abs() > 1.0,
    }
}
