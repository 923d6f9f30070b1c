//! Command handlers for the Wayfare CLI
//!
//! This module implements the command handlers that connect CLI arguments to
//! the configuration, the document store and the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::app::store::{DocumentStore, MemoryStore};
use crate::app::{first_conflict, AvailabilityChecker, StayRange};
use crate::cli::{AvailabilityArgs, ConfigAction, ConfigArgs, ServeArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::server::{self, AppState};

/// Handle the serve command
///
/// Loads configuration, applies CLI overrides, builds shared state once and
/// serves until shutdown.
pub async fn handle_serve(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::load(config_path).await?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot {
        config.store.snapshot_path = Some(snapshot);
    }
    config.validate()?;

    let addr = config.bind_addr()?;
    let state = AppState::build(&config).await?;

    println!("🚀 Wayfare listening on http://{}", addr);
    server::serve(state, addr, &config.server.cors_origins).await
}

/// Handle the availability command
///
/// Reports whether the room is free for the stay and, if not, which
/// reservation holds it.
pub async fn handle_availability(
    args: AvailabilityArgs,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let snapshot = match args.snapshot {
        Some(path) => path,
        None => AppConfig::load(config_path).await?.snapshot_path(),
    };

    let stay = StayRange::parse(&args.from, &args.to)?;
    if !snapshot.exists() {
        return Err(AppError::generic(format!(
            "Store snapshot not found: {}",
            snapshot.display()
        )));
    }

    debug!("Checking room {} in {}", args.room, snapshot.display());
    let store = Arc::new(MemoryStore::open(&snapshot).await?);
    let checker = AvailabilityChecker::new(store.clone());

    println!("🏨 Room {}", args.room);
    println!(
        "   Stay: {} -> {} ({} night{})",
        stay.start(),
        stay.end(),
        stay.nights(),
        if stay.nights() == 1 { "" } else { "s" }
    );

    if checker.is_stay_overlapping(&args.room, &stay).await? {
        let reservations = store.confirmed_reservations_for_room(&args.room).await?;
        if let Some(existing) = first_conflict(&stay, &reservations) {
            let (start, end) = existing.day_span();
            println!(
                "❌ Unavailable: reservation {} holds {} -> {}",
                existing.id, start, end
            );
        } else {
            println!("❌ Unavailable");
        }
    } else {
        println!("✅ Available");
    }

    Ok(())
}

/// Handle configuration management commands
pub async fn handle_config(args: ConfigArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.action {
        ConfigAction::Init { path } => {
            let target = path.or(config_path);
            let written = AppConfig::initialize_first_run(target).await?;
            info!("Configuration available at {}", written.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = AppConfig::load(config_path).await?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| AppError::generic(format!("Failed to render config: {}", e)))?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
