//! Persistent calibration history.
//!
//! The history lives in `calibration.json` inside the store directory as a
//! pretty-printed JSON array, rewritten in full on each sample through a temp
//! file and an atomic rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of samples retained (oldest evicted first)
pub const MAX_SAMPLES: usize = 20;

/// File name of the calibration history inside the store directory
pub const CALIBRATION_FILE: &str = "calibration.json";

/// Errors at the storage boundary.
///
/// Never returned from the public store API; the store logs them and falls
/// back to its in-memory history.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Filesystem operation failed
    #[error("calibration I/O failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid JSON or does not match the sample schema
    #[error("malformed calibration file {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Top-level JSON value is not an array
    #[error("calibration file {path:?} does not contain a list")]
    NotAList { path: PathBuf },
}

/// One (estimated, actual) observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSample {
    /// When the sample was recorded
    pub timestamp: DateTime<Utc>,
    /// Percentage the monitor predicted
    pub estimated_pct: f64,
    /// Percentage the upstream service reported
    pub actual_pct: f64,
}

impl CalibrationSample {
    /// Create a sample stamped now, with both percentages rounded to 2 decimals
    pub fn new(estimated_pct: f64, actual_pct: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            estimated_pct: round2(estimated_pct),
            actual_pct: round2(actual_pct),
        }
    }

    /// Ratio actual/estimated, or `None` when the estimate is not positive
    fn ratio(&self) -> Option<f64> {
        (self.estimated_pct > 0.0).then(|| self.actual_pct / self.estimated_pct)
    }
}

/// Bounded, file-backed calibration history
#[derive(Debug)]
pub struct CalibrationStore {
    config_dir: PathBuf,
    file_path: PathBuf,
    samples: Vec<CalibrationSample>,
}

impl CalibrationStore {
    /// Open a store rooted at `config_dir`, loading any existing history.
    ///
    /// The directory is not created until the first sample is written.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let file_path = config_dir.join(CALIBRATION_FILE);
        let mut store = Self {
            config_dir,
            file_path,
            samples: Vec::new(),
        };
        store.reload();
        store
    }

    /// Open a store in the per-user default directory
    pub fn open_default() -> Self {
        Self::new(default_config_dir())
    }

    /// Path of the history file
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Samples currently held in memory, oldest first
    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    /// Record a calibration data point and persist the history.
    ///
    /// Inputs are not range-checked. A failed write is logged and the sample
    /// stays in memory.
    pub fn add_sample(&mut self, estimated_pct: f64, actual_pct: f64) {
        self.samples
            .push(CalibrationSample::new(estimated_pct, actual_pct));
        if self.samples.len() > MAX_SAMPLES {
            let excess = self.samples.len() - MAX_SAMPLES;
            self.samples.drain(..excess);
        }

        match save_samples(&self.config_dir, &self.file_path, &self.samples) {
            Ok(()) => debug!(
                count = self.samples.len(),
                "Saved calibration history to {:?}", self.file_path
            ),
            Err(e) => warn!("Failed to save calibration data: {}", e),
        }
    }

    /// Mean of actual/estimated over samples with a positive estimate.
    ///
    /// Re-reads the file first so that samples recorded by another run are
    /// picked up. Returns `1.0` when no sample qualifies.
    pub fn get_multiplier(&mut self) -> f64 {
        self.reload();

        let ratios: Vec<f64> = self
            .samples
            .iter()
            .filter_map(CalibrationSample::ratio)
            .collect();

        if ratios.is_empty() {
            return 1.0;
        }
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }

    /// Refresh the in-memory history from disk.
    ///
    /// A missing file keeps what is already in memory; unreadable or
    /// malformed content resets the history to empty.
    fn reload(&mut self) {
        match load_samples(&self.file_path) {
            Ok(Some(samples)) => self.samples = samples,
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to load calibration data: {}", e);
                self.samples.clear();
            }
        }
    }
}

/// Default per-user store directory.
///
/// `$XDG_CONFIG_HOME/usagemon` (or the platform equivalent), then
/// `~/.usagemon`, then `./.usagemon`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("usagemon"))
        .or_else(|| dirs::home_dir().map(|p| p.join(".usagemon")))
        .unwrap_or_else(|| PathBuf::from(".usagemon"))
}

/// Read the history file. `Ok(None)` when it does not exist.
fn load_samples(path: &Path) -> Result<Option<Vec<CalibrationSample>>, CalibrationError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| CalibrationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| CalibrationError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if !value.is_array() {
        return Err(CalibrationError::NotAList {
            path: path.to_path_buf(),
        });
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| CalibrationError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the full history atomically (temp file, fsync, rename).
fn save_samples(
    dir: &Path,
    path: &Path,
    samples: &[CalibrationSample],
) -> Result<(), CalibrationError> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;

    let json = serde_json::to_string_pretty(samples).map_err(|source| CalibrationError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("tmp");
    // Leftover from an interrupted write
    let _ = fs::remove_file(&temp_path);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(io_err(&temp_path))?;
    file.write_all(json.as_bytes())
        .map_err(io_err(&temp_path))?;
    file.sync_all().map_err(io_err(&temp_path))?;

    fs::rename(&temp_path, path).map_err(io_err(path))?;
    Ok(())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CalibrationError {
    let path = path.to_path_buf();
    move |source| CalibrationError::Io { path, source }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(store: &CalibrationStore) -> Vec<(f64, f64)> {
        store
            .samples()
            .iter()
            .map(|s| (s.estimated_pct, s.actual_pct))
            .collect()
    }

    #[test]
    fn test_empty_store_multiplier_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        assert_eq!(store.get_multiplier(), 1.0);
        assert!(!store.file_path().exists());
    }

    #[test]
    fn test_multiplier_skips_non_positive_estimates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(0.0, 5.0);
        store.add_sample(10.0, 12.0);
        assert!((store.get_multiplier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_multiplier_only_zero_estimates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(0.0, 40.0);
        store.add_sample(-3.0, 10.0);
        assert_eq!(store.get_multiplier(), 1.0);
    }

    #[test]
    fn test_multiplier_is_mean_of_ratios() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(50.0, 100.0); // 2.0
        store.add_sample(40.0, 40.0); // 1.0
        assert!((store.get_multiplier() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_add_sample_rounds_to_two_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(33.33333, 66.6666);
        assert_eq!(pairs(&store), vec![(33.33, 66.67)]);
    }

    #[test]
    fn test_add_sample_accepts_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(-5.0, 250.0);
        assert_eq!(pairs(&store), vec![(-5.0, 250.0)]);
    }

    #[test]
    fn test_history_keeps_last_twenty_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        for i in 1..=25 {
            store.add_sample(i as f64, i as f64 * 2.0);
        }

        let expected: Vec<(f64, f64)> = (6..=25).map(|i| (i as f64, i as f64 * 2.0)).collect();
        assert_eq!(pairs(&store), expected);

        let reopened = CalibrationStore::new(dir.path());
        assert_eq!(pairs(&reopened), expected);
    }

    #[test]
    fn test_history_length_below_bound() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        for i in 0..7 {
            store.add_sample(10.0 + i as f64, 11.0);
        }
        assert_eq!(CalibrationStore::new(dir.path()).samples().len(), 7);
    }

    #[test]
    fn test_round_trip_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(12.5, 14.0);
        store.add_sample(80.0, 72.25);
        store.add_sample(45.0, 60.0);

        let reopened = CalibrationStore::new(dir.path());
        assert_eq!(reopened.samples(), store.samples());
    }

    #[test]
    fn test_file_is_pretty_json_array_without_temp_leftover() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CalibrationStore::new(dir.path());
        store.add_sample(10.0, 20.0);

        let content = fs::read_to_string(store.file_path()).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.contains("\"estimated_pct\": 10.0"));
        assert!(content.contains("\"actual_pct\": 20.0"));
        assert!(content.contains("\"timestamp\""));
        assert!(!store.file_path().with_extension("tmp").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = CalibrationStore::new(&nested);
        store.add_sample(10.0, 10.0);
        assert!(nested.join(CALIBRATION_FILE).exists());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CALIBRATION_FILE), "{not json").unwrap();

        let mut store = CalibrationStore::new(dir.path());
        assert!(store.samples().is_empty());
        assert_eq!(store.get_multiplier(), 1.0);
    }

    #[test]
    fn test_non_list_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CALIBRATION_FILE),
            r#"{"estimated_pct": 10.0, "actual_pct": 20.0}"#,
        )
        .unwrap();

        let mut store = CalibrationStore::new(dir.path());
        assert_eq!(store.get_multiplier(), 1.0);
    }

    #[test]
    fn test_get_multiplier_sees_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = CalibrationStore::new(dir.path());
        assert_eq!(reader.get_multiplier(), 1.0);

        let mut writer = CalibrationStore::new(dir.path());
        writer.add_sample(20.0, 30.0);

        assert!((reader.get_multiplier() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CALIBRATION_FILE),
            r#"[{"actual_pct": 5.0}, {"estimated_pct": 10.0, "actual_pct": 15.0}]"#,
        )
        .unwrap();

        let mut store = CalibrationStore::new(dir.path());
        assert_eq!(store.samples().len(), 2);
        assert!((store.get_multiplier() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_unwritable_directory_keeps_in_memory_history() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be makes create_dir_all fail
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "").unwrap();

        let mut store = CalibrationStore::new(&blocker);
        store.add_sample(10.0, 25.0);
        assert_eq!(store.samples().len(), 1);
        assert!((store.get_multiplier() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_default_config_dir_uses_xdg_config_home() {
        temp_env::with_var("XDG_CONFIG_HOME", Some("/tmp/usagemon-xdg"), || {
            if cfg!(target_os = "linux") {
                assert_eq!(
                    default_config_dir(),
                    PathBuf::from("/tmp/usagemon-xdg/usagemon")
                );
            }
        });
    }
}
