use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Settings;
use crate::state::SharedState;

use super::feed::Feed;

/// Message sent from poller to main loop
#[derive(Debug)]
pub enum PollMessage {
    /// Latest feed contents, clock fields stamped
    FeedUpdated(Feed),
    /// Error during polling
    Error(String),
}

/// Poller that re-reads the usage feed file on an interval
pub struct Poller {
    feed_path: PathBuf,
    settings: Settings,
    state: SharedState,
}

impl Poller {
    /// Create a new poller
    pub fn new(settings: Settings, state: SharedState) -> Self {
        Self {
            feed_path: settings.feed_path(),
            settings,
            state,
        }
    }

    /// Start polling in a background task
    pub fn start(self) -> mpsc::Receiver<PollMessage> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    /// Run the polling loop
    async fn run(self, tx: mpsc::Sender<PollMessage>) {
        let interval_ms = self.settings.refresh_interval_ms;
        let mut backoff_ms: u64 = 0;
        let mut last_error: Option<String> = None;
        let mut last_error_at: Option<Instant> = None;
        let mut first = true;

        loop {
            if !self.state.read().running {
                break;
            }

            // First poll is immediate so the screen is populated at startup
            if !first {
                let delay = interval_ms.saturating_add(backoff_ms);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            first = false;

            match self.poll_once() {
                Ok(feed) => {
                    backoff_ms = 0;
                    last_error = None;
                    last_error_at = None;

                    if tx.send(PollMessage::FeedUpdated(feed)).await.is_err() {
                        break; // Receiver dropped
                    }
                }
                Err(e) => {
                    let err_str = format!("{:#}", e);
                    let should_send = match &last_error {
                        Some(prev) if prev == &err_str => last_error_at
                            .map(|t| t.elapsed() >= Duration::from_secs(2))
                            .unwrap_or(true),
                        _ => true,
                    };

                    if should_send && tx.send(PollMessage::Error(err_str.clone())).await.is_err()
                    {
                        break;
                    }

                    last_error = Some(err_str);
                    last_error_at = Some(Instant::now());
                    backoff_ms = if backoff_ms == 0 {
                        200
                    } else {
                        (backoff_ms * 2).min(2000)
                    };
                }
            }
        }
    }

    /// Perform a single poll
    fn poll_once(&self) -> Result<Feed> {
        let mut feed = Feed::read(&self.feed_path)?;
        feed.stamp(
            Utc::now(),
            &self.settings.timezone,
            self.settings.time_format,
        );
        debug!(
            active = feed.session.is_some(),
            official = feed.official.is_some(),
            "Polled feed {:?}",
            self.feed_path
        );
        Ok(feed)
    }
}
