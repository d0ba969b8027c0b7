//! Usage snapshots fed to the display engine.
//!
//! Producing these (metering, session tracking, the upstream usage API) is
//! the caller's job; this crate only consumes them.

pub mod types;

pub use types::{IdleSnapshot, ModelStats, OfficialUsage, UsageSnapshot, UsageWindow};
