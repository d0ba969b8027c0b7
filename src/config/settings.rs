use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use usagemon_core::calibration::default_config_dir;
use usagemon_core::plans::Plan;
use usagemon_core::utils::time::{is_valid_timezone, TimeFormat};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Live usage dashboard with self-calibrating estimates")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the usage feed file
    #[arg(short, long)]
    pub feed: Option<PathBuf>,

    /// Plan name (custom, pro, max5, max20, ...)
    #[arg(short, long)]
    pub plan: Option<String>,

    /// Display timezone (IANA name, e.g. Europe/Warsaw)
    #[arg(short, long)]
    pub timezone: Option<String>,

    /// Clock style (12h or 24h)
    #[arg(long)]
    pub time_format: Option<TimeFormat>,

    /// Refresh interval in milliseconds
    #[arg(short = 'r', long)]
    pub refresh_ms: Option<u64>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the dashboard on a synthetic feed
    Demo,
    /// Record a calibration sample and/or show the current multiplier
    Calibrate {
        /// Estimated usage percentage at session end
        #[arg(long, requires = "actual")]
        estimated: Option<f64>,
        /// Actual usage percentage reported upstream
        #[arg(long, requires = "estimated")]
        actual: Option<f64>,
    },
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if running in demo mode
    pub fn is_demo_mode(&self) -> bool {
        matches!(self.command, Some(Command::Demo))
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Plan used for the idle screen and as the feed default
    #[serde(default)]
    pub plan: Plan,

    /// Display timezone
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Clock style
    #[serde(default)]
    pub time_format: TimeFormat,

    /// Refresh interval in milliseconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// Usage feed file (default: `<config dir>/feed.json`)
    #[serde(default)]
    pub feed_path: Option<PathBuf>,

    /// Calibration store directory (default: per-user config dir)
    #[serde(default)]
    pub calibration_dir: Option<PathBuf>,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_refresh_interval() -> u64 {
    1000
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plan: Plan::default(),
            timezone: default_timezone(),
            time_format: TimeFormat::default(),
            refresh_interval_ms: default_refresh_interval(),
            feed_path: None,
            calibration_dir: None,
            ui: UiSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("usagemon/config.toml")),
            dirs::home_dir().map(|p| p.join(".usagemon.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(ref feed) = cli.feed {
            self.feed_path = Some(feed.clone());
        }
        if let Some(ref plan) = cli.plan {
            self.plan = Plan::parse(plan);
        }
        if let Some(ref timezone) = cli.timezone {
            self.timezone = timezone.clone();
        }
        if let Some(time_format) = cli.time_format {
            self.time_format = time_format;
        }
        if let Some(refresh_ms) = cli.refresh_ms {
            self.refresh_interval_ms = refresh_ms;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Clamps the refresh interval and replaces an unknown timezone with UTC.
    pub fn validate(&mut self) {
        const MIN_REFRESH_INTERVAL: u64 = 100;

        if self.refresh_interval_ms < MIN_REFRESH_INTERVAL {
            self.refresh_interval_ms = MIN_REFRESH_INTERVAL;
        }
        if !is_valid_timezone(&self.timezone) {
            warn!("Unknown timezone '{}', falling back to UTC", self.timezone);
            self.timezone = default_timezone();
        }
    }

    /// Directory holding calibration data, the default feed and the log
    pub fn data_dir(&self) -> PathBuf {
        self.calibration_dir
            .clone()
            .unwrap_or_else(default_config_dir)
    }

    /// Resolved feed file path
    pub fn feed_path(&self) -> PathBuf {
        self.feed_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join("feed.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.refresh_interval_ms, 1000);
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.plan, Plan::Custom);
        assert!(settings.ui.color);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            plan = "max20"
            timezone = "Europe/Warsaw"
            time_format = "12h"
            refresh_interval_ms = 2500
            feed_path = "/tmp/feed.json"

            [ui]
            color = false
        "#;

        let settings: Settings = toml::from_str(toml).expect("Should parse TOML");
        assert_eq!(settings.plan, Plan::Max20);
        assert_eq!(settings.timezone, "Europe/Warsaw");
        assert_eq!(settings.time_format, TimeFormat::TwelveHour);
        assert_eq!(settings.refresh_interval_ms, 2500);
        assert_eq!(settings.feed_path(), PathBuf::from("/tmp/feed.json"));
        assert!(!settings.ui.color);
    }

    #[test]
    fn test_validate_clamps_and_fixes_timezone() {
        let mut settings = Settings {
            refresh_interval_ms: 5,
            timezone: "Nowhere/Special".to_string(),
            ..Default::default()
        };
        settings.validate();
        assert_eq!(settings.refresh_interval_ms, 100);
        assert_eq!(settings.timezone, "UTC");
    }

    #[test]
    fn test_merge_cli_takes_precedence() {
        let cli = Config::parse_from([
            "usagemon",
            "--plan",
            "PRO",
            "--timezone",
            "Asia/Tokyo",
            "--time-format",
            "12h",
            "--refresh-ms",
            "250",
        ]);
        let mut settings = Settings::default();
        settings.merge_cli(&cli);
        assert_eq!(settings.plan, Plan::Pro);
        assert_eq!(settings.timezone, "Asia/Tokyo");
        assert_eq!(settings.time_format, TimeFormat::TwelveHour);
        assert_eq!(settings.refresh_interval_ms, 250);
    }

    #[test]
    fn test_feed_defaults_to_data_dir() {
        let settings = Settings {
            calibration_dir: Some(PathBuf::from("/var/lib/usagemon")),
            ..Default::default()
        };
        assert_eq!(
            settings.feed_path(),
            PathBuf::from("/var/lib/usagemon/feed.json")
        );
    }

    #[test]
    fn test_load_from_xdg_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("usagemon");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "plan = \"max5\"\n").unwrap();
        // Home fallback for platforms whose config dir ignores XDG
        std::fs::write(dir.path().join(".usagemon.toml"), "plan = \"max5\"\n").unwrap();

        temp_env::with_vars(
            [
                ("XDG_CONFIG_HOME", Some(dir.path().as_os_str())),
                ("HOME", Some(dir.path().as_os_str())),
            ],
            || {
                let settings = Settings::load(None).unwrap();
                assert_eq!(settings.plan, Plan::Max5);
                assert_eq!(settings.refresh_interval_ms, 1000);
            },
        );
    }

    #[test]
    fn test_explicit_path_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "plan = [").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_calibrate_requires_both_values() {
        assert!(Config::try_parse_from(["usagemon", "calibrate", "--estimated", "40"]).is_err());
        let cli =
            Config::try_parse_from(["usagemon", "calibrate", "--estimated", "40", "--actual", "52"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Calibrate {
                estimated: Some(_),
                actual: Some(_)
            })
        ));
    }
}
