pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod progress;

pub use cli::{Cli, Commands, ConfigCommands};
pub use commands::{declared_mime, paste_bytes, PasteStatus};
pub use config::Config;
pub use output::{OutputFormatter, TerminalPrompt};
pub use progress::ProgressReporter;
