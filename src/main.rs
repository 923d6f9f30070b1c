//! Wayfare CLI application
//!
//! Runs the booking and search API, checks room availability against a store
//! snapshot, and manages the configuration file.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wayfare::cli::{handle_availability, handle_config, handle_serve, Cli, Commands};
use wayfare::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("Wayfare v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = cli.global.config.clone();
    match cli.command {
        Commands::Serve(args) => {
            info!("Executing serve command");
            handle_serve(args, config_path).await
        }
        Commands::Availability(args) => {
            info!("Executing availability command");
            handle_availability(args, config_path).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, config_path).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let mut filter = EnvFilter::from_default_env();
    for directive in [
        format!("wayfare={}", log_level),
        format!("tower_http={}", log_level),
    ] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
