//! Progress bar primitives.
//!
//! Bars are plain strings with `[style]…[/]` markup around each glyph run.

use std::collections::BTreeMap;

use crate::usage::ModelStats;
use crate::utils::time::{format_time, percentage};

/// Default bar width in columns
pub const DEFAULT_BAR_WIDTH: usize = 50;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Style for a usage percentage: low below 50, medium below 80, high otherwise
pub fn cost_style(percent: f64) -> &'static str {
    if percent < 50.0 {
        "cost.low"
    } else if percent < 80.0 {
        "cost.medium"
    } else {
        "cost.high"
    }
}

/// Colored dot for a usage percentage, same thresholds as [`cost_style`]
pub fn usage_icon(percent: f64) -> &'static str {
    if percent < 50.0 {
        "🟢"
    } else if percent < 80.0 {
        "🟡"
    } else {
        "🔴"
    }
}

/// Glyph-level bar renderer shared by the specific bars
#[derive(Debug, Clone, Copy)]
pub struct TokenProgressBar {
    width: usize,
}

impl Default for TokenProgressBar {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH)
    }
}

impl TokenProgressBar {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Whole filled segments for `value` out of `max`, clamped to the width
    pub fn calculate_filled_segments(&self, value: f64, max: f64) -> usize {
        if max <= 0.0 || value <= 0.0 {
            return 0;
        }
        let filled = (self.width as f64 * value / max) as usize;
        filled.min(self.width)
    }

    /// Render `filled` solid segments followed by empty ones
    pub fn render_bar(&self, filled: usize, filled_style: &str, empty_style: &str) -> String {
        let filled = filled.min(self.width);
        let empty = self.width - filled;
        let mut bar = String::new();
        if filled > 0 {
            bar.push_str(&format!(
                "[{}]{}[/]",
                filled_style,
                FILLED.to_string().repeat(filled)
            ));
        }
        if empty > 0 {
            bar.push_str(&format!(
                "[{}]{}[/]",
                empty_style,
                EMPTY.to_string().repeat(empty)
            ));
        }
        bar
    }

    /// Token usage bar: `🟢 [███░░░]   12.5%`
    pub fn render(&self, percent: f64) -> String {
        let (icon, style) = if percent >= 90.0 {
            ("🔴", "cost.high")
        } else if percent >= 50.0 {
            ("🟡", "cost.medium")
        } else {
            ("🟢", "cost.low")
        };
        let filled = self.calculate_filled_segments(percent.min(100.0), 100.0);
        let bar = self.render_bar(filled, style, "table.border");
        format!("{} [{}] {:6.1}%", icon, bar, percent)
    }
}

/// Elapsed-session bar annotated with the remaining time
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeProgressBar {
    bar: TokenProgressBar,
}

impl TimeProgressBar {
    pub fn render(&self, elapsed_minutes: f64, total_minutes: f64) -> String {
        let percent = percentage(elapsed_minutes, total_minutes);
        let filled = self.bar.calculate_filled_segments(percent.min(100.0), 100.0);
        let bar = self.bar.render_bar(filled, "progress.bar", "table.border");
        let remaining = (total_minutes - elapsed_minutes).max(0.0);
        format!("⏰ [{}] {}", bar, format_time(remaining))
    }
}

/// Family a model name belongs to, for the distribution bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelFamily {
    Sonnet,
    Opus,
    Other,
}

impl ModelFamily {
    fn of(model: &str) -> Self {
        let lower = model.to_ascii_lowercase();
        if lower.contains("sonnet") {
            ModelFamily::Sonnet
        } else if lower.contains("opus") {
            ModelFamily::Opus
        } else {
            ModelFamily::Other
        }
    }
}

/// Token split between model families
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelUsageBar {
    bar: TokenProgressBar,
}

impl ModelUsageBar {
    /// `[sonnet|opus|other] Sonnet 60.0% | Opus 40.0%`
    pub fn render(&self, stats: &BTreeMap<String, ModelStats>) -> String {
        let width = self.bar.width();
        let mut sonnet = 0u64;
        let mut opus = 0u64;
        let mut other = 0u64;
        for (model, s) in stats {
            match ModelFamily::of(model) {
                ModelFamily::Sonnet => sonnet += s.total_tokens(),
                ModelFamily::Opus => opus += s.total_tokens(),
                ModelFamily::Other => other += s.total_tokens(),
            }
        }

        let total = sonnet + opus + other;
        if total == 0 {
            let empty = self.bar.render_bar(0, "dim", "table.border");
            return format!("[{}] No model data", empty);
        }

        let pct = |n: u64| percentage(n as f64, total as f64);
        let (sonnet_pct, opus_pct, other_pct) = (pct(sonnet), pct(opus), pct(other));

        let sonnet_cols = (width as f64 * sonnet_pct / 100.0) as usize;
        let opus_cols = (width as f64 * opus_pct / 100.0) as usize;
        // Rounding slack goes to the last non-empty family
        let other_cols = width.saturating_sub(sonnet_cols + opus_cols);
        let (sonnet_cols, opus_cols, other_cols) = match (other > 0, opus > 0) {
            (true, _) => (sonnet_cols, opus_cols, other_cols),
            (false, true) => (sonnet_cols, opus_cols + other_cols, 0),
            (false, false) => (sonnet_cols + other_cols + opus_cols, 0, 0),
        };

        let mut bar = String::new();
        for (cols, style) in [
            (sonnet_cols, "info"),
            (opus_cols, "warning"),
            (other_cols, "dim"),
        ] {
            if cols > 0 {
                bar.push_str(&format!("[{}]{}[/]", style, FILLED.to_string().repeat(cols)));
            }
        }

        let summary: Vec<String> = [
            ("Sonnet", sonnet, sonnet_pct),
            ("Opus", opus, opus_pct),
            ("Other", other, other_pct),
        ]
        .into_iter()
        .filter(|(_, tokens, _)| *tokens > 0)
        .map(|(name, _, p)| format!("{} {:.1}%", name, p))
        .collect();

        format!("[{}] {}", bar, summary.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(s: &str, glyph: char) -> usize {
        s.chars().filter(|c| *c == glyph).count()
    }

    #[test]
    fn test_filled_segments_clamped() {
        let bar = TokenProgressBar::default();
        assert_eq!(bar.calculate_filled_segments(50.0, 100.0), 25);
        assert_eq!(bar.calculate_filled_segments(250.0, 100.0), 50);
        assert_eq!(bar.calculate_filled_segments(-5.0, 100.0), 0);
        assert_eq!(bar.calculate_filled_segments(5.0, 0.0), 0);
    }

    #[test]
    fn test_render_bar_markup() {
        let bar = TokenProgressBar::new(4);
        assert_eq!(
            bar.render_bar(1, "cost.low", "table.border"),
            "[cost.low]█[/][table.border]░░░[/]"
        );
        assert_eq!(bar.render_bar(4, "cost.high", "x"), "[cost.high]████[/]");
        assert_eq!(bar.render_bar(0, "a", "b"), "[b]░░░░[/]");
    }

    #[test]
    fn test_token_bar_thresholds() {
        let bar = TokenProgressBar::default();
        assert!(bar.render(10.0).starts_with("🟢"));
        assert!(bar.render(60.0).starts_with("🟡"));
        assert!(bar.render(95.0).starts_with("🔴"));
        assert!(bar.render(0.0).ends_with("   0.0%"));
    }

    #[test]
    fn test_time_bar_remaining() {
        let bar = TimeProgressBar::default();
        let out = bar.render(180.0, 300.0);
        assert!(out.ends_with("] 2h"));
        assert_eq!(glyphs(&out, '█'), 30);

        let over = bar.render(400.0, 300.0);
        assert!(over.ends_with("] 0m"));
        assert_eq!(glyphs(&over, '█'), 50);
    }

    #[test]
    fn test_model_bar_split() {
        let mut stats = BTreeMap::new();
        stats.insert(
            "claude-sonnet-4".to_string(),
            ModelStats {
                input_tokens: 500,
                output_tokens: 100,
                ..Default::default()
            },
        );
        stats.insert(
            "claude-opus-4".to_string(),
            ModelStats {
                input_tokens: 300,
                output_tokens: 100,
                ..Default::default()
            },
        );

        let out = ModelUsageBar::default().render(&stats);
        assert!(out.ends_with("Sonnet 60.0% | Opus 40.0%"));
        assert_eq!(glyphs(&out, '█'), 50);
        assert!(out.contains("[info]"));
        assert!(out.contains("[warning]"));
    }

    #[test]
    fn test_model_bar_empty() {
        let out = ModelUsageBar::default().render(&BTreeMap::new());
        assert!(out.ends_with("No model data"));
        assert_eq!(glyphs(&out, '░'), 50);
    }
}
