mod store;

pub use store::{AppState, FeedSource, SessionOutcome, SharedState};
