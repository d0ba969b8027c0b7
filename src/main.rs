use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use usagemon::config::{Command, Config, Settings};
use usagemon::state::FeedSource;
use usagemon::ui::App;
use usagemon_core::calibration::CalibrationStore;

/// Log file written while the dashboard owns the terminal
const LOG_FILE: &str = "usagemon.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);

    // Setup logging; the dashboard owns stdout, so it logs to a file
    match cli.command {
        Some(Command::Calibrate { .. }) => setup_logging(cli.debug, None)?,
        _ => setup_logging(cli.debug, Some(&settings.data_dir()))?,
    }
    settings.validate();

    match cli.command {
        Some(Command::Calibrate { estimated, actual }) => calibrate(&settings, estimated, actual),
        Some(Command::Demo) => App::new(settings, FeedSource::Demo).run().await,
        None => App::new(settings, FeedSource::File).run().await,
    }
}

/// Record a sample if one was given, then print the current multiplier
fn calibrate(settings: &Settings, estimated: Option<f64>, actual: Option<f64>) -> Result<()> {
    let mut store = CalibrationStore::new(settings.data_dir());
    if let (Some(estimated), Some(actual)) = (estimated, actual) {
        store.add_sample(estimated, actual);
    }

    let multiplier = store.get_multiplier();
    println!("Calibration file: {}", store.file_path().display());
    println!("Samples: {}", store.samples().len());
    println!("Multiplier: {:.3}", multiplier);
    Ok(())
}

fn setup_logging(debug: bool, log_dir: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("usagemon=debug,usagemon_core=debug")
    } else {
        EnvFilter::new("usagemon=info,usagemon_core=info")
    };

    let registry = tracing_subscriber::registry().with(filter);
    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {:?}", dir))?;
            let path = dir.join(LOG_FILE);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}
