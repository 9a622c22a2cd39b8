pub mod commands;
pub mod controller;

pub use commands::{handle_command, CommandOutcome, PlayerCommand};
pub use controller::PlaybackController;
