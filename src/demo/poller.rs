use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::monitor::PollMessage;
use crate::state::SharedState;

use super::scenario::DemoScenario;

/// Wall-clock time per simulated minute
const TICK: Duration = Duration::from_millis(200);

/// Demo poller that replaces the real Poller in demo mode
pub struct DemoPoller {
    settings: Settings,
    state: SharedState,
}

impl DemoPoller {
    /// Create a new DemoPoller
    pub fn new(settings: Settings, state: SharedState) -> Self {
        Self { settings, state }
    }

    /// Start the demo poller, returning a receiver for poll messages (same interface as Poller)
    pub fn start(self) -> mpsc::Receiver<PollMessage> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    /// Main demo loop: one simulated minute per tick
    async fn run(self, tx: mpsc::Sender<PollMessage>) {
        let scenario = DemoScenario {
            plan: self.settings.plan.clone(),
            time_format: self.settings.time_format,
        };
        let mut interval = tokio::time::interval(TICK);
        let mut tick: u32 = 0;

        loop {
            interval.tick().await;

            if !self.state.read().running {
                break;
            }

            let now = Utc::now();
            let mut feed = scenario.feed_at(tick, now);
            feed.stamp(now, &self.settings.timezone, self.settings.time_format);

            if tx.send(PollMessage::FeedUpdated(feed)).await.is_err() {
                break; // Receiver dropped
            }
            tick = tick.wrapping_add(1);
        }
    }
}
