use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

use usagemon_core::display::SessionDisplay;

use crate::monitor::Feed;

/// Shared state type alias
pub type SharedState = Arc<RwLock<AppState>>;

/// Where the dashboard gets its data from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSource {
    /// Feed file written by an external process
    #[default]
    File,
    /// Built-in synthetic session
    Demo,
}

impl FeedSource {
    /// Get display name for the source
    pub fn display_name(&self) -> &'static str {
        match self {
            FeedSource::File => "Feed",
            FeedSource::Demo => "Demo",
        }
    }
}

/// Estimated and actual percentages of a finished session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOutcome {
    pub estimated_pct: f64,
    pub actual_pct: f64,
}

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Latest feed contents
    pub feed: Feed,
    /// Whether at least one feed has arrived
    pub has_feed: bool,
    /// Data source shown in the status bar
    pub source: FeedSource,
    /// Calibration multiplier used for the last render
    pub multiplier: f64,
    /// Error message to display
    pub error_message: Option<String>,
    /// Last poll timestamp
    pub last_poll: Option<Instant>,
    /// Whether the application is running
    pub running: bool,
    /// Last (estimated, actual) pair seen while a session was active
    last_outcome: Option<SessionOutcome>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            feed: Feed::default(),
            has_feed: false,
            source: FeedSource::default(),
            multiplier: 1.0,
            error_message: None,
            last_poll: None,
            running: true,
            last_outcome: None,
        }
    }

    /// Create a new shared state
    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replace the feed.
    ///
    /// Returns the outcome of the previous session when this update ends it
    /// and that session had official usage to compare against.
    pub fn update_feed(&mut self, feed: Feed) -> Option<SessionOutcome> {
        let ended = match &feed.session {
            Some(session) => {
                let actual = feed
                    .official
                    .as_ref()
                    .and_then(|o| o.five_hour.as_ref())
                    .map(|w| w.percent());
                if let Some(actual_pct) = actual {
                    self.last_outcome = Some(SessionOutcome {
                        estimated_pct: SessionDisplay::predicted_percentage(session),
                        actual_pct,
                    });
                }
                None
            }
            None => self.last_outcome.take(),
        };

        self.feed = feed;
        self.has_feed = true;
        self.last_poll = Some(Instant::now());
        ended
    }

    /// Set error message
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    /// Clear error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Stop the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}
