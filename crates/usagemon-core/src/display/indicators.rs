//! Small inline indicators for rates and costs.

/// Emoji describing how fast tokens are being consumed
pub struct VelocityIndicator;

impl VelocityIndicator {
    pub fn emoji(burn_rate: f64) -> &'static str {
        if burn_rate < 50.0 {
            "🐌"
        } else if burn_rate < 150.0 {
            "➡️"
        } else if burn_rate < 300.0 {
            "🚀"
        } else {
            "⚡"
        }
    }
}

/// Dollar amounts styled by magnitude
pub struct CostIndicator;

impl CostIndicator {
    fn style(cost: f64) -> &'static str {
        if cost < 1.0 {
            "cost.low"
        } else if cost < 10.0 {
            "cost.medium"
        } else {
            "cost.high"
        }
    }

    /// Session total, two decimals
    pub fn render(cost: f64) -> String {
        format!("[{}]${:.2}[/]", Self::style(cost), cost)
    }

    /// Per-minute rate, four decimals
    pub fn render_rate(cost_per_minute: f64) -> String {
        format!("[{}]${:.4}[/]", Self::style(cost_per_minute), cost_per_minute)
    }
}
