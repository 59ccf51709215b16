//! Guide application settings.
//!
//! Programmatic defaults, optionally overridden from a TOML file. Any
//! problem loading or parsing the file falls back to the defaults rather
//! than aborting — the guide should always start.

use std::time::Duration;

/// Runtime configuration for the guide server.
#[derive(Debug, Clone)]
pub struct GuideSettings {
    /// TCP port to listen on.
    pub port: u16,
    /// Log filter (e.g. "info", "guide_example=debug").
    pub log_level: String,
    /// Probability in `[0, 1]` that a store write fails, for demonstrating
    /// the downstream-failure reply.
    pub fail_rate: f64,
    /// Simulated latency of the external email lookup, in milliseconds.
    pub check_delay_ms: u64,
    /// Upper bound on the async refinement batch, in milliseconds.
    pub refine_timeout_ms: u64,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            fail_rate: 0.5,
            check_delay_ms: 500,
            refine_timeout_ms: 5000,
        }
    }
}

impl GuideSettings {
    /// Returns the refinement timeout as a [`Duration`].
    pub const fn refine_timeout(&self) -> Duration {
        Duration::from_millis(self.refine_timeout_ms)
    }
}

/// Loads settings from a TOML file, falling back to defaults for missing
/// keys or an unreadable file.
pub fn load_settings(path: &str) -> GuideSettings {
    let mut settings = GuideSettings::default();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::info!("Settings file not found ({e}). Using defaults.");
            return settings;
        }
    };

    let config = match toml::from_str::<toml::Value>(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to parse TOML settings: {e}. Using defaults.");
            return settings;
        }
    };

    if let Some(port) = config.get("port").and_then(toml::Value::as_integer) {
        settings.port = port as u16;
    }
    if let Some(level) = config.get("log_level").and_then(toml::Value::as_str) {
        settings.log_level = level.to_string();
    }
    if let Some(rate) = config.get("fail_rate").and_then(toml::Value::as_float) {
        settings.fail_rate = rate.clamp(0.0, 1.0);
    }
    if let Some(delay) = config.get("check_delay_ms").and_then(toml::Value::as_integer) {
        settings.check_delay_ms = delay as u64;
    }
    if let Some(timeout) = config
        .get("refine_timeout_ms")
        .and_then(toml::Value::as_integer)
    {
        settings.refine_timeout_ms = timeout as u64;
    }

    settings
}
