//! # Equipment Interface
//!
//! This module defines the capabilities the robot expects from its equipment drivers.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod input;
pub mod motor;
