//! Demo mode: a synthetic session that runs through a full usage window.
//!
//! Official usage appears near the end of each simulated session, so the
//! calibration loop records a sample every time a session finishes.

mod poller;
mod scenario;

pub use poller::DemoPoller;
pub use scenario::DemoScenario;
