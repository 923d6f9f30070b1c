//! Command-line argument parsing for Wayfare
//!
//! This module defines the CLI structure using clap derive macros: running
//! the API server, checking room availability against a store snapshot, and
//! managing the configuration file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Wayfare - travel booking backend
#[derive(Parser, Debug)]
#[command(
    name = "wayfare",
    version,
    about = "Hotel, bus and flight booking backend",
    long_about = "Serves the Wayfare booking and search API.
Room bookings are checked for overlapping stays and search results are cached with fixed TTLs."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Check whether a room is free for a stay
    Availability(AvailabilityArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on (overrides config and WAYFARE_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Store snapshot file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the availability command
#[derive(Args, Debug, Clone)]
pub struct AvailabilityArgs {
    /// Room identifier
    #[arg(short, long)]
    pub room: String,

    /// Check-in date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub from: String,

    /// Check-out date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub to: String,

    /// Store snapshot file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file if none exists
    Init {
        /// Where to write the file (default: user config directory)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    ///
    /// `serve` logs lifecycle events at info by default; one-shot commands
    /// stay at warn unless asked.
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose || matches!(self.command, Commands::Serve(_)) {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}
