mod app;
pub mod components;
pub mod markup;

pub use app::App;
