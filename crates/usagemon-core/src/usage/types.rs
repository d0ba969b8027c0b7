//! Usage data consumed by the display engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::plans::{Plan, DEFAULT_COST_LIMIT, DEFAULT_MESSAGES_LIMIT};
use crate::utils::time::{percentage, TimeFormat};

/// Token and cost totals for one model within a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub entries_count: u64,
}

impl ModelStats {
    /// Tokens counted toward the model distribution
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Live metrics of an active session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Plan tier
    pub plan: Plan,
    /// IANA timezone name used for display
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub tokens_used: u64,
    pub token_limit: u64,
    pub tokens_left: u64,
    pub elapsed_session_minutes: f64,
    pub total_session_minutes: f64,
    /// Tokens per minute
    pub burn_rate: f64,
    /// Session cost in USD
    pub session_cost: f64,
    #[serde(default)]
    pub per_model_stats: BTreeMap<String, ModelStats>,
    pub sent_messages: u64,
    /// Formatted time at which tokens are predicted to run out
    #[serde(default)]
    pub predicted_end_str: String,
    /// Formatted time at which the limit resets
    #[serde(default)]
    pub reset_time_str: String,
    /// Formatted wall-clock time for the footer
    #[serde(default)]
    pub current_time_str: String,
    /// Clock against which reset countdowns are measured
    #[serde(default = "Utc::now")]
    pub now: DateTime<Utc>,
    /// P90-derived cost ceiling for tiered plans
    #[serde(default = "default_cost_limit")]
    pub cost_limit_p90: f64,
    /// P90-derived message ceiling for tiered plans
    #[serde(default = "default_messages_limit")]
    pub messages_limit_p90: u64,
    #[serde(default)]
    pub show_switch_notification: bool,
    #[serde(default)]
    pub show_exceed_notification: bool,
    #[serde(default)]
    pub show_tokens_will_run_out: bool,
    /// Token limit before any automatic bump
    #[serde(default)]
    pub original_limit: u64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_cost_limit() -> f64 {
    DEFAULT_COST_LIMIT
}

fn default_messages_limit() -> u64 {
    DEFAULT_MESSAGES_LIMIT
}

impl UsageSnapshot {
    /// Empty snapshot for `plan` with the plan's default limits
    pub fn new(plan: Plan) -> Self {
        let limits = plan.limits();
        Self {
            plan,
            timezone: default_timezone(),
            tokens_used: 0,
            token_limit: limits.token_limit,
            tokens_left: limits.token_limit,
            elapsed_session_minutes: 0.0,
            total_session_minutes: 300.0,
            burn_rate: 0.0,
            session_cost: 0.0,
            per_model_stats: BTreeMap::new(),
            sent_messages: 0,
            predicted_end_str: String::new(),
            reset_time_str: String::new(),
            current_time_str: String::new(),
            now: Utc::now(),
            cost_limit_p90: DEFAULT_COST_LIMIT,
            messages_limit_p90: DEFAULT_MESSAGES_LIMIT,
            show_switch_notification: false,
            show_exceed_notification: false,
            show_tokens_will_run_out: false,
            original_limit: limits.token_limit,
        }
    }

    /// Tokens used as a percentage of the limit (may exceed 100)
    pub fn token_percentage(&self) -> f64 {
        percentage(self.tokens_used as f64, self.token_limit as f64)
    }
}

/// One utilization window reported by the upstream usage API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    /// Either a fraction (0.0-1.0) or a percentage
    #[serde(default)]
    pub utilization: f64,
    /// ISO-8601 instant at which the window resets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resets_at: Option<String>,
}

impl UsageWindow {
    /// Utilization as a percentage; values up to 1.0 are read as fractions
    pub fn percent(&self) -> f64 {
        if self.utilization <= 1.0 {
            self.utilization * 100.0
        } else {
            self.utilization
        }
    }
}

/// Usage as reported by the upstream usage API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficialUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_hour: Option<UsageWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seven_day: Option<UsageWindow>,
}

impl OfficialUsage {
    /// Whether any window is present
    pub fn has_data(&self) -> bool {
        self.five_hour.is_some() || self.seven_day.is_some()
    }

    /// Present windows with their short labels, in display order
    pub fn windows(&self) -> impl Iterator<Item = (&'static str, &UsageWindow)> {
        [("5h", self.five_hour.as_ref()), ("7d", self.seven_day.as_ref())]
            .into_iter()
            .filter_map(|(label, window)| window.map(|w| (label, w)))
    }
}

/// Inputs of the screen shown while no session is active
#[derive(Debug, Clone)]
pub struct IdleSnapshot {
    pub plan: Plan,
    pub timezone: String,
    pub token_limit: u64,
    pub current_time: Option<DateTime<Utc>>,
    pub time_format: TimeFormat,
}
