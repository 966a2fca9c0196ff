//! Application settings loaded from config.toml
//!
//! Every field has a default, so the file is optional and may list only the
//! values it wants to change. `HOST` and `PORT` environment variables override
//! the server section after the file has been read.

use crate::errors::{Error, Result};
use chrono::Duration;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Defaults applied when a cart is created without explicit times
    pub cart: CartSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string suitable for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cart lifetime defaults
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CartSettings {
    /// Minutes until a new cart expires
    pub expires_after_minutes: i64,
    /// Hours a new cart row is kept
    pub keep_for_hours: i64,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            expires_after_minutes: 30,
            keep_for_hours: 24,
        }
    }
}

impl CartSettings {
    pub fn expires_after(&self) -> Result<Duration> {
        Duration::try_minutes(self.expires_after_minutes)
            .ok_or_else(|| out_of_range("expires_after_minutes"))
    }

    pub fn keep_for(&self) -> Result<Duration> {
        Duration::try_hours(self.keep_for_hours).ok_or_else(|| out_of_range("keep_for_hours"))
    }

    fn validate(&self) -> Result<()> {
        if self.expires_after_minutes <= 0 || self.keep_for_hours <= 0 {
            return Err(Error::Config {
                message: "Cart durations must be positive".to_string(),
            });
        }
        self.expires_after()?;
        self.keep_for()?;
        Ok(())
    }
}

fn out_of_range(field: &str) -> Error {
    Error::Config {
        message: format!("cart.{field} is out of range"),
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_settings(&contents)
}

/// Loads ./config.toml when present, otherwise defaults, then applies `HOST`/`PORT`.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    let settings = if path.exists() {
        load_settings(path)?
    } else {
        tracing::debug!("No config.toml found, using default settings");
        Settings::default()
    };

    apply_env_overrides(
        settings,
        std::env::var("HOST").ok(),
        std::env::var("PORT").ok(),
    )
}

fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.cart.validate()?;
    Ok(settings)
}

fn apply_env_overrides(
    mut settings: Settings,
    host: Option<String>,
    port: Option<String>,
) -> Result<Settings> {
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port.trim().parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT value {port:?}: {e}"),
        })?;
    }
    Ok(settings)
}
