//! Feed polling.

pub mod feed;
mod poller;

pub use feed::Feed;
pub use poller::{PollMessage, Poller};
