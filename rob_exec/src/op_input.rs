//! # Operator input
//!
//! Holds the latest frame from the operator's controller. The executable replaces the frame as
//! new input arrives, and the triggers and drive command read from it through [`InputSource`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;

use comms_if::eqpt::input::{AxisId, ButtonId, InputFrame, InputSource};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The operator's controller, as last seen.
#[derive(Debug, Default)]
pub struct OpInput {
    frame: RefCell<InputFrame>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl OpInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame.
    pub fn set_frame(&self, frame: InputFrame) {
        *self.frame.borrow_mut() = frame;
    }

    /// Release every button and centre every axis.
    pub fn clear(&self) {
        self.set_frame(InputFrame::default())
    }
}

impl InputSource for OpInput {
    fn axis(&self, id: AxisId) -> f64 {
        self.frame.borrow().axis(id)
    }

    fn button(&self, id: ButtonId) -> bool {
        self.frame.borrow().button(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_op_input() {
        let input = OpInput::new();
        assert!(!input.button(ButtonId::R1));

        let mut frame = InputFrame::default();
        frame.buttons.insert(ButtonId::R1);
        frame.axes.insert(AxisId::LeftY, -0.5);
        input.set_frame(frame);

        assert!(input.button(ButtonId::R1));
        assert_eq!(input.axis(AxisId::LeftY), -0.5);

        input.clear();
        assert_eq!(input.axis(AxisId::LeftY), 0.0);
    }
}
