mod app_events;
mod app_render;
mod app_state;
pub mod command;

// Re-export public types
pub use app_render::Transcript;
pub use app_state::App;
pub use command::Command;
