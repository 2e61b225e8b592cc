//! Configuration management
//!
//! Config is a TOML file passed with `--config`. Every section and field
//! is optional; missing values fall back to defaults.
//!
//! ```toml
//! [sink]
//! initial_backpressure = true
//! ready_timeout_ms = 0
//!
//! [transport]
//! url = "ws://127.0.0.1:9000"
//!
//! [logs]
//! verbose = false
//! ```

use crate::constants::{DEFAULT_INITIAL_BACKPRESSURE, DEFAULT_READY_TIMEOUT_MS, DEFAULT_URL};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sink: SinkConfig,
    pub transport: TransportConfig,
    pub logs: LogsConfig,
}

// =============================================================================
// Sink Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Backpressure assumed before the consumer's first signal
    ///
    /// `true` (default): the consumer must send
    /// `{"type":"backpressure","backpressure":false}` once bound, or the
    /// producer never starts. `false`: start immediately.
    pub initial_backpressure: bool,

    /// How long the CLI waits for the consumer to become ready
    /// (milliseconds, 0 = forever)
    pub ready_timeout_ms: u64,
}

impl SinkConfig {
    /// Readiness timeout, if one is configured
    pub fn ready_timeout(&self) -> Option<Duration> {
        (self.ready_timeout_ms > 0).then(|| Duration::from_millis(self.ready_timeout_ms))
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            initial_backpressure: DEFAULT_INITIAL_BACKPRESSURE,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
        }
    }
}

// =============================================================================
// Transport Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// WebSocket URL of the consumer peer
    pub url: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Debug-level tracing output
    pub verbose: bool,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let url = self.transport.url.as_str();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(BridgeError::ConfigValidation {
                field: "transport.url",
                reason: format!("expected ws:// or wss:// URL, got '{}'", url),
            });
        }
        Ok(())
    }
}

/// Load config from a file, failing on read or parse errors
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| BridgeError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| BridgeError::ConfigValidation {
        field: "config",
        reason: format!("{}: {}", path.display(), e),
    })
}

/// Load config from an optional file, falling back to defaults
pub fn load(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };

    match load_from(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

/// Save config to file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).map_err(|e| BridgeError::ConfigValidation {
        field: "config",
        reason: e.to_string(),
    })?;
    fs::write(path, content).map_err(|e| BridgeError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

// ============================================================================
// Tests
// ============================================================================
