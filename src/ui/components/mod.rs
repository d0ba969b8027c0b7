mod dashboard;
mod status_bar;

pub use dashboard::Dashboard;
pub use status_bar::StatusBar;
