//! Screen composition for active and idle sessions.

use crate::plans::Plan;
use crate::usage::{IdleSnapshot, OfficialUsage, UsageSnapshot};
use crate::utils::time::{
    format_reset_time, format_thousands, format_time_in_zone, percentage, per_minute,
};

use super::header::HeaderManager;
use super::indicators::{CostIndicator, VelocityIndicator};
use super::progress::{
    cost_style, usage_icon, ModelUsageBar, TimeProgressBar, TokenProgressBar,
};

/// Width of the bars in the tiered layout
pub const WIDE_BAR_WIDTH: usize = 50;

/// Placeholder when the current time cannot be shown
const TIME_PLACEHOLDER: &str = "--:--:--";

fn separator() -> String {
    format!("[separator]{}[/]", "─".repeat(60))
}

/// Builds the dashboard as a list of markup lines
#[derive(Debug, Clone, Default)]
pub struct SessionDisplay {
    token_progress: TokenProgressBar,
    time_progress: TimeProgressBar,
    model_usage: ModelUsageBar,
}

impl SessionDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 50-column bar with a colored dot.
    ///
    /// Color follows the uncapped percentage; fill saturates at 100%.
    pub fn render_wide_progress_bar(&self, percent: f64) -> String {
        let bar = TokenProgressBar::new(WIDE_BAR_WIDTH);
        let style = cost_style(percent);
        let filled = if percent >= 100.0 {
            WIDE_BAR_WIDTH
        } else {
            bar.calculate_filled_segments(percent.min(100.0), 100.0)
        };
        format!(
            "{} [{}]",
            usage_icon(percent),
            bar.render_bar(filled, style, "table.border")
        )
    }

    /// Cost and message percentages against the P90 limits (capped at 100,
    /// 0 when the limit is unset), plus the uncapped token percentage
    fn breakdown(data: &UsageSnapshot) -> (f64, f64, f64) {
        let cost = if data.cost_limit_p90 > 0.0 {
            percentage(data.session_cost, data.cost_limit_p90).min(100.0)
        } else {
            0.0
        };
        let messages = if data.messages_limit_p90 > 0 {
            percentage(data.sent_messages as f64, data.messages_limit_p90 as f64).min(100.0)
        } else {
            0.0
        };
        (cost, data.token_percentage(), messages)
    }

    /// Uncalibrated estimate: the highest of cost, token and message usage
    pub fn predicted_percentage(data: &UsageSnapshot) -> f64 {
        let (cost, tokens, messages) = Self::breakdown(data);
        cost.max(tokens).max(messages)
    }

    /// Compose the screen for an active session.
    ///
    /// `official` replaces the estimated usage bar when it carries at least
    /// one window. `calibration_multiplier` scales the estimate otherwise.
    pub fn format_active_session_screen(
        &self,
        data: &UsageSnapshot,
        official: Option<&OfficialUsage>,
        calibration_multiplier: Option<f64>,
    ) -> Vec<String> {
        let mut lines = HeaderManager::create_header(data.plan.name(), &data.timezone);

        if data.plan.is_tiered() {
            self.render_tiered(&mut lines, data, official, calibration_multiplier);
        } else {
            self.render_basic(&mut lines, data);
        }

        lines.push(String::new());
        lines.push("🔮 [value]Predictions:[/]".to_string());
        lines.push(format!(
            "   [info]Tokens will run out:[/] [warning]{}[/]",
            data.predicted_end_str
        ));
        lines.push(format!(
            "   [info]Limit resets at:[/]     [success]{}[/]",
            data.reset_time_str
        ));
        lines.push(String::new());

        Self::add_notifications(&mut lines, data);

        lines.push(format!(
            "⏰ [dim]{}[/] 📝 [success]Active session[/] | [dim]Ctrl+C to exit[/] 🟢",
            data.current_time_str
        ));
        lines
    }

    /// Wide layout for plans with P90 limits
    fn render_tiered(
        &self,
        lines: &mut Vec<String>,
        data: &UsageSnapshot,
        official: Option<&OfficialUsage>,
        calibration_multiplier: Option<f64>,
    ) {
        let (cost_pct, token_pct, messages_pct) = Self::breakdown(data);

        match official.filter(|o| o.has_data()) {
            Some(usage) => self.render_official_usage(lines, usage, data),
            None => {
                let mut predicted = cost_pct.max(token_pct).max(messages_pct);
                let label = match calibration_multiplier {
                    Some(m) if (m - 1.0).abs() > f64::EPSILON => {
                        predicted = (predicted * m).min(100.0);
                        "Cal. Claude Usage"
                    }
                    _ => "Est. Claude Usage",
                };
                lines.push(String::new());
                lines.push(format!(
                    "⚡ [value]{}:[/]   {} {:4.1}%    [dim](max of cost/tokens/messages)[/dim]",
                    label,
                    self.render_wide_progress_bar(predicted),
                    predicted
                ));
            }
        }

        lines.push(String::new());
        if data.plan == Plan::Custom {
            lines.push("[bold]📊 Session-Based Dynamic Limits[/bold]".to_string());
            lines.push(
                "[dim]Based on your historical usage patterns when hitting limits (P90)[/dim]"
                    .to_string(),
            );
            lines.push(separator());
        } else {
            lines.push(String::new());
        }

        lines.push(format!(
            "💰 [value]Cost Usage:[/]           {} {:4.1}%    [value]${:.2}[/] / [dim]${:.2}[/]",
            self.render_wide_progress_bar(cost_pct),
            cost_pct,
            data.session_cost,
            data.cost_limit_p90
        ));
        lines.push(String::new());

        lines.push(format!(
            "📊 [value]Token Usage:[/]          {} {:4.1}%    [value]{}[/] / [dim]{}[/]",
            self.render_wide_progress_bar(token_pct),
            token_pct,
            format_thousands(data.tokens_used),
            format_thousands(data.token_limit)
        ));
        lines.push(String::new());

        lines.push(format!(
            "📨 [value]Messages Usage:[/]       {} {:4.1}%    [value]{}[/] / [dim]{}[/]",
            self.render_wide_progress_bar(messages_pct),
            messages_pct,
            data.sent_messages,
            format_thousands(data.messages_limit_p90)
        ));
        lines.push(separator());

        let time_pct = percentage(data.elapsed_session_minutes, data.total_session_minutes);
        let remaining = (data.total_session_minutes - data.elapsed_session_minutes).max(0.0);
        let (hours, mins) = ((remaining / 60.0) as u64, (remaining % 60.0) as u64);
        lines.push(format!(
            "⏱️  [value]Time to Reset:[/]       {} {}h {}m",
            self.render_wide_progress_bar(time_pct),
            hours,
            mins
        ));
        lines.push(String::new());

        lines.push(format!(
            "🤖 [value]Model Distribution:[/]   {}",
            self.model_usage.render(&data.per_model_stats)
        ));
        lines.push(separator());

        lines.push(format!(
            "🔥 [value]Burn Rate:[/]              [warning]{:.1}[/] [dim]tokens/min[/] {}",
            data.burn_rate,
            VelocityIndicator::emoji(data.burn_rate)
        ));
        let cost_rate = per_minute(data.session_cost, data.elapsed_session_minutes);
        lines.push(format!(
            "💲 [value]Cost Rate:[/]              {} [dim]$/min[/]",
            CostIndicator::render_rate(cost_rate)
        ));
    }

    /// One bar per official window, each with its reset countdown
    fn render_official_usage(
        &self,
        lines: &mut Vec<String>,
        usage: &OfficialUsage,
        data: &UsageSnapshot,
    ) {
        lines.push(String::new());
        lines.push("[bold]⚡ Claude Official Usage[/bold]".to_string());

        for (label, window) in usage.windows() {
            let pct = window.percent();
            let reset = window
                .resets_at
                .as_deref()
                .filter(|s| !s.is_empty())
                .and_then(|s| format_reset_time(s, data.now))
                .map(|r| match r.as_str() {
                    "now" => "    [dim]resets now[/dim]".to_string(),
                    _ => format!("    [dim]resets in {}[/dim]", r),
                })
                .unwrap_or_default();

            lines.push(format!(
                "⚡ [value]Claude Usage ({}):[/] {} {:4.1}%{}",
                label,
                self.render_wide_progress_bar(pct),
                pct,
                reset
            ));
        }

        lines.push(separator());
    }

    /// Narrow layout for plans without P90 limits
    fn render_basic(&self, lines: &mut Vec<String>, data: &UsageSnapshot) {
        let cost_rate = per_minute(data.session_cost, data.elapsed_session_minutes);
        lines.push(format!(
            "💲 [value]Session Cost:[/]   {}",
            CostIndicator::render(data.session_cost)
        ));
        lines.push(format!(
            "💲 [value]Cost Rate:[/]      {} [dim]$/min[/]",
            CostIndicator::render_rate(cost_rate)
        ));
        lines.push(String::new());

        lines.push(format!(
            "📊 [value]Token Usage:[/]    {}",
            self.token_progress.render(data.token_percentage())
        ));
        lines.push(String::new());

        lines.push(format!(
            "🎯 [value]Tokens:[/]         [value]{}[/] / [dim]~{}[/] ([info]{} left[/])",
            format_thousands(data.tokens_used),
            format_thousands(data.token_limit),
            format_thousands(data.tokens_left)
        ));
        lines.push(format!(
            "🔥 [value]Burn Rate:[/]      [warning]{:.1}[/] [dim]tokens/min[/] {}",
            data.burn_rate,
            VelocityIndicator::emoji(data.burn_rate)
        ));
        lines.push(format!(
            "📨 [value]Sent Messages:[/]  [info]{}[/] [dim]messages[/]",
            data.sent_messages
        ));

        if !data.per_model_stats.is_empty() {
            lines.push(format!(
                "🤖 [value]Model Usage:[/]    {}",
                self.model_usage.render(&data.per_model_stats)
            ));
        }
        lines.push(String::new());

        lines.push(format!(
            "⏱️  [value]Time to Reset:[/]  {}",
            self.time_progress
                .render(data.elapsed_session_minutes, data.total_session_minutes)
        ));
        lines.push(String::new());
    }

    /// Independent warnings; a blank line follows only if any was shown
    fn add_notifications(lines: &mut Vec<String>, data: &UsageSnapshot) {
        let mut added = false;

        if data.show_switch_notification && data.token_limit > data.original_limit {
            lines.push(format!(
                "🔄 [warning]Token limit exceeded ({} tokens)[/]",
                format_thousands(data.token_limit)
            ));
            added = true;
        }

        if data.show_exceed_notification {
            lines.push("⚠️  [error]You have exceeded the maximum cost limit![/]".to_string());
            added = true;
        }

        if data.show_tokens_will_run_out {
            lines.push("⏰ [warning]Cost limit will be exceeded before reset![/]".to_string());
            added = true;
        }

        if added {
            lines.push(String::new());
        }
    }

    /// Compose the screen shown while no session is active.
    ///
    /// All usage figures are zero. The footer shows the current time in the
    /// configured zone, or a placeholder when the zone or clock is missing.
    pub fn format_no_active_session_screen(&self, idle: &IdleSnapshot) -> Vec<String> {
        let mut lines = HeaderManager::create_header(idle.plan.name(), &idle.timezone);

        lines.push(format!(
            "📊 [value]Token Usage:[/]    {}",
            self.token_progress.render(0.0)
        ));
        lines.push(String::new());
        lines.push(format!(
            "🎯 [value]Tokens:[/]         [value]0[/] / [dim]~{}[/] ([info]0 left[/])",
            format_thousands(idle.token_limit)
        ));
        lines.push("🔥 [value]Burn Rate:[/]      [warning]0.0[/] [dim]tokens/min[/]".to_string());
        lines.push("💲 [value]Cost Rate:[/]      [cost.low]$0.00[/] [dim]$/min[/]".to_string());
        lines.push("📨 [value]Sent Messages:[/]  [info]0[/] [dim]messages[/]".to_string());
        lines.push(String::new());

        let current_time = idle
            .current_time
            .and_then(|now| format_time_in_zone(now, &idle.timezone, idle.time_format, true))
            .unwrap_or_else(|| TIME_PLACEHOLDER.to_string());
        lines.push(format!(
            "⏰ [dim]{}[/] 📝 [info]No active session[/] | [dim]Ctrl+C to exit[/] 🟨",
            current_time
        ));
        lines
    }
}
