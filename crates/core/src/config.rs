//! Application configuration.
//!
//! Values come from built-in defaults, then `<config_dir>/railres/config.toml`,
//! then `RAILRES_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
/// Message shown after a cancellation when none is configured.
pub const DEFAULT_REFUND_NOTICE: &str = "Refund will be processed within 7-10 working days.";
/// Directory under the user's config directory holding the config file.
pub const CONFIG_DIR: &str = "railres";
/// Config file name.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix for environment overrides, e.g. `RAILRES_CURRENCY_SYMBOL`.
pub const ENV_PREFIX: &str = "RAILRES";

const DEFAULT_CONFIG_TOML: &str = r#"# Railway reservation console settings.

# Symbol printed in front of every amount.
currency_symbol = "₹"

# Ask for a yes/no confirmation (showing the refund) before cancelling.
confirm_cancellation = true

# Shown after a ticket is cancelled.
refund_notice = "Refund will be processed within 7-10 working days."

# Log file directory, relative to the working directory unless absolute.
log_dir = "logs"

# Input poll interval in milliseconds.
tick_rate_ms = 250
"#;

/// Settings for the console driver. Fare rules are fixed and not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Symbol printed in front of amounts.
    pub currency_symbol: String,
    /// Whether cancellation asks for confirmation first.
    pub confirm_cancellation: bool,
    /// Cosmetic message shown after a cancellation.
    pub refund_notice: String,
    /// Directory receiving the log file.
    pub log_dir: PathBuf,
    /// Input poll interval in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            confirm_cancellation: true,
            refund_notice: DEFAULT_REFUND_NOTICE.to_string(),
            log_dir: PathBuf::from("logs"),
            tick_rate_ms: 250,
        }
    }
}

impl AppConfig {
    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from `path` plus environment overrides. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Poll interval as a duration, never zero.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

/// `<config_dir>/railres/config.toml`, falling back to the working directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the default config file if none exists yet. Returns its path and
/// whether it was written just now.
pub fn ensure_default_config() -> Result<(PathBuf, bool)> {
    let path = default_config_path();
    let created = ensure_default_config_at(&path)?;
    Ok((path, created))
}

/// Write the default config to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
