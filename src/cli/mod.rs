//! Command-line interface components
//!
//! This module contains CLI-specific code for the Wayfare application:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{
    AvailabilityArgs, Cli, Commands, ConfigAction, ConfigArgs, GlobalArgs, ServeArgs,
};
pub use commands::{handle_availability, handle_config, handle_serve};
