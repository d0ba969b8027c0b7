//! Display engine: maps usage snapshots to markup lines.
//!
//! Lines carry `[style]…[/]` tags that the terminal front end resolves to
//! colors. Nothing here touches the terminal.

mod header;
mod indicators;
mod progress;
mod session;

pub use header::HeaderManager;
pub use indicators::{CostIndicator, VelocityIndicator};
pub use progress::{
    cost_style, usage_icon, ModelUsageBar, TimeProgressBar, TokenProgressBar, DEFAULT_BAR_WIDTH,
};
pub use session::{SessionDisplay, WIDE_BAR_WIDTH};
