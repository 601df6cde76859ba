//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// vnotes - Record, play back, and back up personal voice notes
#[derive(Parser, Debug)]
#[command(name = "vnotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new voice note (Ctrl-C stops and saves)
    Record {
        /// Optional display name for the note
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List voice notes
    List {
        /// Maximum number of notes to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Filter notes by name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Play a voice note (Ctrl-C stops)
    Play {
        /// Note ID or ID prefix
        id: String,

        /// Start position in seconds
        #[arg(short, long)]
        from: Option<u64>,

        /// Playback speed override (defaults to the configured speed)
        #[arg(long)]
        speed: Option<f32>,
    },

    /// Rename a voice note
    Rename {
        /// Note ID or ID prefix
        id: String,

        /// New display name
        name: String,
    },

    /// Delete a voice note and its audio file
    Delete {
        /// Note ID or ID prefix
        id: String,
    },

    /// Export all notes as a single backup file
    Export {
        /// Open the backup file with the system handler after writing
        #[arg(long)]
        open: bool,
    },

    /// Import notes from a backup file
    Import {
        /// Path to a backup JSON file
        path: PathBuf,
    },

    /// User preferences (quality, speed, auto backup)
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show current preferences
    Show,

    /// Set recording quality (low, medium, high)
    Quality { level: String },

    /// Set playback speed (e.g. 1.0, 1.5)
    Speed { value: f32 },

    /// Enable or disable automatic backup
    Backup {
        #[arg(value_parser = clap::builder::BoolishValueParser::new(), action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
