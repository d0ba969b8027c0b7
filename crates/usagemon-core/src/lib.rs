//! Core library for usagemon.
//!
//! Holds the calibration store that corrects estimated usage percentages and
//! the display engine that turns a usage snapshot into dashboard lines.

pub mod calibration;
pub mod display;
pub mod plans;
pub mod usage;
pub mod utils;
