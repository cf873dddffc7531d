mod app;
mod banner;

use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use anyhow::{Context, Result};
use railres_core::{
    config::{self, AppConfig},
    BookingDesk,
};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    let (config_path, created) = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config)?;
    if created {
        tracing::info!(path = %config_path.display(), "Wrote default configuration");
    }
    tracing::info!(config = %config_path.display(), "Starting railway reservation console");

    let desk = BookingDesk::new();
    let mut app = app::RailApp::new(desk, config);
    app.run()?;

    println!("✓ Thank you for using Railway Reservation System!");
    println!("✓ Have a safe journey!");
    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = if config.log_dir.is_absolute() {
        config.log_dir.clone()
    } else {
        std::env::current_dir()?.join(&config.log_dir)
    };
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("railres.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
