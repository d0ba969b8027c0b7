//! Number and time formatting shared by the display components.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clock style for displayed times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "12h" | "12" => Ok(TimeFormat::TwelveHour),
            "24h" | "24" => Ok(TimeFormat::TwentyFourHour),
            other => Err(format!("invalid time format '{}' (expected 12h or 24h)", other)),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::TwelveHour => f.write_str("12h"),
            TimeFormat::TwentyFourHour => f.write_str("24h"),
        }
    }
}

/// `value / total * 100`, or 0 when `total` is not positive
pub fn percentage(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

/// Rate per minute, using at least one minute as the divisor.
///
/// Returns 0 before any time has elapsed.
pub fn per_minute(value: f64, elapsed_minutes: f64) -> f64 {
    if elapsed_minutes > 0.0 {
        value / elapsed_minutes.max(1.0)
    } else {
        0.0
    }
}

/// Format an integer with `,` thousands separators
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a duration in minutes as `45m`, `2h` or `2h 5m`
pub fn format_time(minutes: f64) -> String {
    let total = minutes.max(0.0) as u64;
    if total < 60 {
        return format!("{}m", total);
    }
    let hours = total / 60;
    let mins = total % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Format a wall-clock time in the requested clock style
pub fn format_display_time<Z: TimeZone>(
    dt: &DateTime<Z>,
    format: TimeFormat,
    include_seconds: bool,
) -> String
where
    Z::Offset: fmt::Display,
{
    let pattern = match (format, include_seconds) {
        (TimeFormat::TwelveHour, true) => "%-I:%M:%S %p",
        (TimeFormat::TwelveHour, false) => "%-I:%M %p",
        (TimeFormat::TwentyFourHour, true) => "%H:%M:%S",
        (TimeFormat::TwentyFourHour, false) => "%H:%M",
    };
    dt.format(pattern).to_string()
}

/// Format `now` in the named IANA timezone; `None` if the name is unknown
pub fn format_time_in_zone(
    now: DateTime<Utc>,
    timezone: &str,
    format: TimeFormat,
    include_seconds: bool,
) -> Option<String> {
    let tz: Tz = timezone.parse().ok()?;
    Some(format_display_time(
        &now.with_timezone(&tz),
        format,
        include_seconds,
    ))
}

/// Whether `timezone` names a known IANA zone
pub fn is_valid_timezone(timezone: &str) -> bool {
    timezone.parse::<Tz>().is_ok()
}

/// Humanize the time remaining until an ISO-8601 instant.
///
/// Returns `"now"` once the instant has passed, otherwise the non-zero units
/// among days, hours and minutes (`"1d 1h"`, `"2h 5m"`, `"45m"`). Minutes are
/// kept when they are the only unit. `None` when the timestamp is malformed.
pub fn format_reset_time(resets_at: &str, now: DateTime<Utc>) -> Option<String> {
    let reset = DateTime::parse_from_rfc3339(resets_at.trim()).ok()?;
    let total_seconds = (reset.with_timezone(&Utc) - now).num_seconds().max(0);

    if total_seconds == 0 {
        return Some("now".to_string());
    }

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    Some(parts.join(" "))
}
