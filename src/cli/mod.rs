//! Command Line Interface module
//!
//! Implements the CLI commands and argument parsing for muxdeck.

use clap::{Parser, Subcommand};

use crate::surface::Theme;

#[derive(Parser, Debug, Clone)]
#[command(name = "muxdeck")]
#[command(about = "Multiplexing client for remote interactive sessions")]
#[command(
    long_about = "Operate several long-running remote sessions from one terminal, switching between them without losing state"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(long, default_value = "config.toml")]
    pub config_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Dry-run mode: show the resolved configuration without connecting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start interactive terminal session
    #[command(hide = true)]
    Interactive,

    /// Manage sessions on the backend
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// List configured agents
    Agents,

    /// List tools available to agents
    Tools,

    /// Store the theme preference
    Theme {
        /// dark or light
        theme: Theme,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Interactive
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SessionAction {
    /// List sessions
    List,

    /// Create a session; the server picks a name when none is given
    Create {
        /// Session name
        name: Option<String>,
    },

    /// Rename a session
    Rename {
        /// Session id
        id: String,
        /// New name
        name: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the actual command, using default if none provided
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }

    /// Check if we're running in interactive mode
    pub fn is_interactive_mode(&self) -> bool {
        matches!(self.command(), Commands::Interactive)
    }

    /// Adjust log level based on verbose flag
    pub fn effective_log_level(&self) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            self.log_level.clone()
        }
    }

    /// Check if we're running in dry-run mode
    pub fn is_dry_run_mode(&self) -> bool {
        self.dry_run
    }
}
