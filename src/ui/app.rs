use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use usagemon_core::calibration::CalibrationStore;
use usagemon_core::display::SessionDisplay;
use usagemon_core::usage::IdleSnapshot;

use crate::config::Settings;
use crate::demo::DemoPoller;
use crate::monitor::{PollMessage, Poller};
use crate::state::{AppState, FeedSource, SharedState};

use super::components::{Dashboard, StatusBar};
use super::markup;

/// Main application
pub struct App {
    state: SharedState,
    settings: Settings,
    store: CalibrationStore,
    display: SessionDisplay,
}

impl App {
    /// Create a new application reading from `source`
    pub fn new(settings: Settings, source: FeedSource) -> Self {
        let state = AppState::shared();
        state.write().source = source;
        let store = CalibrationStore::new(settings.data_dir());
        info!("Calibration file {:?}", store.file_path());

        Self {
            state,
            settings,
            store,
            display: SessionDisplay::new(),
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Start poller
        let source = self.state.read().source;
        let mut poll_rx = match source {
            FeedSource::File => Poller::new(self.settings.clone(), self.state.clone()).start(),
            FeedSource::Demo => {
                DemoPoller::new(self.settings.clone(), self.state.clone()).start()
            }
        };

        // Main loop
        let result = self.main_loop(&mut terminal, &mut poll_rx).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        poll_rx: &mut mpsc::Receiver<PollMessage>,
    ) -> Result<()> {
        self.refresh_multiplier();

        loop {
            // Check if we should quit
            {
                let state = self.state.read();
                if !state.running {
                    break;
                }
            }

            // Draw UI
            terminal.draw(|frame| {
                let state = self.state.read();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(1), Constraint::Length(1)])
                    .split(frame.area());

                let lines = self.screen_lines(&state);
                let text = markup::to_text(&lines, self.settings.ui.color);
                Dashboard::render(frame, chunks[0], text);
                StatusBar::render(frame, chunks[1], &state);
            })?;

            // Handle events with timeout
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            // Process poll messages
            while let Ok(msg) = poll_rx.try_recv() {
                self.handle_poll_message(msg);
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.write().quit(),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.write().quit()
            }
            _ => {}
        }
    }

    /// Apply a poller message; a finished session becomes a calibration sample
    fn handle_poll_message(&mut self, msg: PollMessage) {
        match msg {
            PollMessage::FeedUpdated(feed) => {
                let outcome = {
                    let mut state = self.state.write();
                    state.clear_error();
                    state.update_feed(feed)
                };
                if let Some(outcome) = outcome {
                    info!(
                        estimated = outcome.estimated_pct,
                        actual = outcome.actual_pct,
                        "Session ended, recording calibration sample"
                    );
                    self.store
                        .add_sample(outcome.estimated_pct, outcome.actual_pct);
                }
                self.refresh_multiplier();
            }
            PollMessage::Error(error) => {
                self.state.write().set_error(error);
            }
        }
    }

    /// Re-read the calibration file and publish the multiplier
    fn refresh_multiplier(&mut self) {
        let multiplier = self.store.get_multiplier();
        debug!(multiplier, samples = self.store.samples().len(), "Calibration");
        self.state.write().multiplier = multiplier;
    }

    /// Marked-up lines of the current screen
    fn screen_lines(&self, state: &AppState) -> Vec<String> {
        match &state.feed.session {
            Some(session) => self.display.format_active_session_screen(
                session,
                state.feed.official.as_ref(),
                Some(state.multiplier),
            ),
            None => {
                let plan = self.settings.plan.clone();
                let idle = IdleSnapshot {
                    token_limit: plan.limits().token_limit,
                    plan,
                    timezone: self.settings.timezone.clone(),
                    current_time: Some(Utc::now()),
                    time_format: self.settings.time_format,
                };
                self.display.format_no_active_session_screen(&idle)
            }
        }
    }
}
