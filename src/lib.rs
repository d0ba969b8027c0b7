pub mod config;
pub mod demo;
pub mod monitor;
pub mod state;
pub mod ui;
