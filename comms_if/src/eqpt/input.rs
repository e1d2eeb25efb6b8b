//! # Operator Input Interface
//!
//! Decoding of the operator's HID device happens elsewhere, the robot only needs to ask for the
//! current level of an axis or button. Edges are derived by the robot's triggers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of operator input.
pub trait InputSource {
    /// Current value of an axis, in the range [-1.0, +1.0].
    fn axis(&self, id: AxisId) -> f64;

    /// True while the button is held.
    fn button(&self, id: ButtonId) -> bool;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A snapshot of the controller.
///
/// Any axis missing from `axes` is at rest (0.0), any button missing from `buttons` is released.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    #[serde(default)]
    pub axes: HashMap<AxisId, f64>,

    #[serde(default)]
    pub buttons: HashSet<ButtonId>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Analog axes of a PS5 style controller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    LeftX,
    LeftY,
    RightX,
    RightY,
    L2,
    R2,
}

/// Digital buttons of a PS5 style controller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Cross,
    Circle,
    Square,
    Triangle,
    L1,
    R1,
    Options,
    Create,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputSource for InputFrame {
    fn axis(&self, id: AxisId) -> f64 {
        self.axes.get(&id).copied().unwrap_or(0.0).max(-1.0).min(1.0)
    }

    fn button(&self, id: ButtonId) -> bool {
        self.buttons.contains(&id)
    }
}
