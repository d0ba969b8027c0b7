//! Calibration feedback loop for estimated usage percentages.
//!
//! Each finished session contributes one (estimated, actual) pair. The store
//! keeps the most recent pairs on disk and derives a correction multiplier
//! that the display engine applies when no official usage data is available.

mod store;

pub use store::{
    default_config_dir, CalibrationError, CalibrationSample, CalibrationStore, CALIBRATION_FILE,
    MAX_SAMPLES,
};
