//! Usage feed file written by an external metering process.
//!
//! ```json
//! { "session": { "plan": "max5", "tokens_used": 1200, ... }, "official": { "five_hour": { "utilization": 0.4 } } }
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use usagemon_core::usage::{OfficialUsage, UsageSnapshot};
use usagemon_core::utils::time::{format_time_in_zone, TimeFormat};

/// Contents of the feed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    /// Active session, `None` when no session is running
    #[serde(default)]
    pub session: Option<UsageSnapshot>,
    /// Usage reported by the upstream API, if the feeder fetched it
    #[serde(default)]
    pub official: Option<OfficialUsage>,
}

impl Feed {
    /// Read the feed file. A missing file means no active session.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read feed file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse feed file: {:?}", path))
    }

    /// Set the clock fields of the session for this render tick.
    ///
    /// An empty or unknown session timezone is replaced by `timezone`.
    pub fn stamp(&mut self, now: DateTime<Utc>, timezone: &str, time_format: TimeFormat) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let formatted = format_time_in_zone(now, &session.timezone, time_format, true);
        let formatted = match formatted {
            Some(s) => s,
            None => {
                session.timezone = timezone.to_string();
                format_time_in_zone(now, timezone, time_format, true)
                    .unwrap_or_else(|| now.format("%H:%M:%S").to_string())
            }
        };

        session.now = now;
        session.current_time_str = formatted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagemon_core::plans::Plan;

    #[test]
    fn test_missing_feed_is_idle() {
        let dir = tempfile::tempdir().unwrap();
        let feed = Feed::read(&dir.path().join("feed.json")).unwrap();
        assert!(feed.session.is_none());
        assert!(feed.official.is_none());
    }

    #[test]
    fn test_malformed_feed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(Feed::read(&path).is_err());
    }

    #[test]
    fn test_read_feed_with_session_and_official() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(
            &path,
            r#"{
                "session": {
                    "plan": "pro",
                    "timezone": "Europe/Warsaw",
                    "tokens_used": 5000,
                    "token_limit": 19000,
                    "tokens_left": 14000,
                    "elapsed_session_minutes": 60,
                    "total_session_minutes": 300,
                    "burn_rate": 83.3,
                    "session_cost": 2.5,
                    "sent_messages": 20,
                    "predicted_end_str": "15:10",
                    "reset_time_str": "16:00"
                },
                "official": { "five_hour": { "utilization": 0.31, "resets_at": "2026-03-01T16:00:00Z" } }
            }"#,
        )
        .unwrap();

        let feed = Feed::read(&path).unwrap();
        let session = feed.session.unwrap();
        assert_eq!(session.plan, Plan::Pro);
        assert_eq!(session.predicted_end_str, "15:10");
        let official = feed.official.unwrap();
        assert!(official.five_hour.is_some());
        assert!(official.seven_day.is_none());
    }

    #[test]
    fn test_stamp_formats_current_time() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let mut session = UsageSnapshot::new(Plan::Pro);
        session.timezone = "Asia/Tokyo".to_string();
        let mut feed = Feed {
            session: Some(session),
            official: None,
        };
        feed.stamp(now, "UTC", TimeFormat::TwentyFourHour);
        let session = feed.session.as_ref().unwrap();
        assert_eq!(session.current_time_str, "19:00:00");
        assert_eq!(session.now, now);

        let mut bad = UsageSnapshot::new(Plan::Pro);
        bad.timezone = String::new();
        let mut feed = Feed {
            session: Some(bad),
            official: None,
        };
        feed.stamp(now, "Europe/Warsaw", TimeFormat::TwentyFourHour);
        let session = feed.session.unwrap();
        assert_eq!(session.timezone, "Europe/Warsaw");
        assert_eq!(session.current_time_str, "11:00:00");
    }
}
