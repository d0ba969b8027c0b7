use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::BTreeMap;

use usagemon_core::display::SessionDisplay;
use usagemon_core::plans::Plan;
use usagemon_core::usage::{ModelStats, OfficialUsage, UsageSnapshot, UsageWindow};
use usagemon_core::utils::time::{format_display_time, TimeFormat};

use crate::monitor::Feed;

/// Simulated session length in minutes
pub const SESSION_MINUTES: u32 = 300;

/// Idle minutes between simulated sessions
pub const IDLE_MINUTES: u32 = 20;

/// Minutes before the session end during which official usage is reported
const OFFICIAL_WINDOW: u32 = 30;

/// Tokens per simulated minute
const BURN_RATE: f64 = 140.0;

/// Dollars per simulated minute
const COST_PER_MINUTE: f64 = 0.11;

/// Upstream usage runs this much higher than the local estimate
const UPSTREAM_BIAS: f64 = 1.2;

/// Demo scenario for one plan
pub struct DemoScenario {
    pub plan: Plan,
    pub time_format: TimeFormat,
}

impl DemoScenario {
    /// Feed at simulated minute `tick`; sessions repeat with idle gaps
    pub fn feed_at(&self, tick: u32, now: DateTime<Utc>) -> Feed {
        let minute = tick % (SESSION_MINUTES + IDLE_MINUTES);
        if minute >= SESSION_MINUTES {
            return Feed::default();
        }

        let elapsed = f64::from(minute);
        let limits = self.plan.limits();
        let tokens_used = (BURN_RATE * elapsed) as u64;
        let session_cost = COST_PER_MINUTE * elapsed;

        let mut session = UsageSnapshot::new(self.plan.clone());
        session.tokens_used = tokens_used;
        session.token_limit = limits.token_limit;
        session.original_limit = limits.token_limit;
        session.tokens_left = limits.token_limit.saturating_sub(tokens_used);
        session.cost_limit_p90 = limits.cost_limit;
        session.messages_limit_p90 = limits.message_limit;
        session.elapsed_session_minutes = elapsed;
        session.total_session_minutes = f64::from(SESSION_MINUTES);
        session.burn_rate = if minute == 0 { 0.0 } else { BURN_RATE };
        session.session_cost = session_cost;
        session.sent_messages = u64::from(minute / 3);
        session.per_model_stats = model_split(tokens_used);

        let remaining_tokens = session.tokens_left as f64;
        let reset_at = now + ChronoDuration::minutes(i64::from(SESSION_MINUTES - minute));
        let exhausted_at = now + ChronoDuration::minutes((remaining_tokens / BURN_RATE) as i64);
        session.predicted_end_str = format_display_time(&exhausted_at, self.time_format, false);
        session.reset_time_str = format_display_time(&reset_at, self.time_format, false);

        session.show_exceed_notification = session_cost > limits.cost_limit;
        session.show_tokens_will_run_out = exhausted_at < reset_at;

        let official = (minute + OFFICIAL_WINDOW >= SESSION_MINUTES).then(|| {
            let estimated = SessionDisplay::predicted_percentage(&session);
            OfficialUsage {
                five_hour: Some(UsageWindow {
                    utilization: (estimated * UPSTREAM_BIAS).min(100.0) / 100.0,
                    resets_at: Some(reset_at.to_rfc3339()),
                }),
                seven_day: Some(UsageWindow {
                    utilization: 0.18,
                    resets_at: Some((now + ChronoDuration::days(3)).to_rfc3339()),
                }),
            }
        });

        Feed {
            session: Some(session),
            official,
        }
    }
}

/// Roughly 70/30 Sonnet/Opus
fn model_split(tokens: u64) -> BTreeMap<String, ModelStats> {
    let sonnet = tokens * 7 / 10;
    let opus = tokens - sonnet;
    let mut stats = BTreeMap::new();
    stats.insert(
        "claude-sonnet-4".to_string(),
        ModelStats {
            input_tokens: sonnet,
            ..Default::default()
        },
    );
    stats.insert(
        "claude-opus-4".to_string(),
        ModelStats {
            input_tokens: opus,
            ..Default::default()
        },
    );
    stats
}
