//! Presentation layer for family-assistant
//!
//! This crate contains CLI definitions, console output and the waiting
//! indicator shown while a turn runs.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::spinner::TurnSpinner;
