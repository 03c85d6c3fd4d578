// crates/pastefit-cli/src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pastefit - keep pasted and stored images within a maximum resolution
#[derive(Parser)]
#[command(name = "pastefit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Number of files resized at once in batch mode (0 = auto-detect)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Vault directory (defaults to the current directory)
    #[arg(long, global = true, env = "PASTEFIT_VAULT")]
    pub vault: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Paste an image into the vault, resizing it if oversized
    Paste {
        /// Image file, or `-` to read from stdin
        input: PathBuf,

        /// Declared MIME type (guessed from the file extension if omitted)
        #[arg(short, long)]
        mime: Option<String>,
    },

    /// Resize every oversized image in the vault in place
    Batch {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Reset to defaults
    Reset,

    /// Show config file path
    Path,
}
