//! Configuration types for Android MCP Server.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Environment variable overriding the bridge executable path.
pub const ENV_BRIDGE_PATH: &str = "ADB_PATH";

/// Environment variable selecting the target device serial.
pub const ENV_SERIAL: &str = "ADB_SERIAL";

/// Server configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: ServerSettings,
    /// Bridge executable and device target
    pub bridge: BridgeSettings,
    /// Per-class subprocess timeouts
    pub timeouts: TimeoutSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServerConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-style lookup.
    ///
    /// Empty values are ignored so that `ADB_SERIAL=` behaves like unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_BRIDGE_PATH).filter(|v| !v.trim().is_empty()) {
            self.bridge.executable = Some(path);
        }
        if let Some(serial) = lookup(ENV_SERIAL).filter(|v| !v.trim().is_empty()) {
            self.bridge.serial = Some(serial);
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.server.transport != "stdio" {
            return Err(Error::Config(format!(
                "server.transport '{}' is not supported (only stdio)",
                self.server.transport
            )));
        }

        let t = &self.timeouts;
        for (name, value) in [
            ("timeouts.devices_ms", t.devices_ms),
            ("timeouts.input_ms", t.input_ms),
            ("timeouts.query_ms", t.query_ms),
            ("timeouts.screenshot_ms", t.screenshot_ms),
            ("timeouts.shell_ms", t.shell_ms),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be > 0")));
            }
        }

        if let Some(serial) = &self.bridge.serial {
            if serial.trim().is_empty() || serial.chars().any(char::is_whitespace) {
                return Err(Error::Config(format!(
                    "bridge.serial must be a single non-empty token, got '{serial}'"
                )));
            }
        }

        if self.bridge.executable.as_deref().map(str::trim) == Some("") {
            return Err(Error::Config("bridge.executable cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Transport type (only stdio is served)
    pub transport: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Bridge executable and device target settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Path or name of the adb executable (None = discover)
    pub executable: Option<String>,
    /// Device serial to target (None = the single attached device)
    pub serial: Option<String>,
}

/// Class of bridge command, used to pick a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutClass {
    /// Device enumeration
    Devices,
    /// Input injection (tap, swipe, text, key)
    Input,
    /// Read-only queries (screen size, apps, device info)
    Query,
    /// Screen capture
    Screenshot,
    /// Caller-supplied shell command
    Shell,
}

/// Subprocess timeouts in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Device enumeration timeout
    pub devices_ms: u64,
    /// Input injection timeout
    pub input_ms: u64,
    /// Query timeout
    pub query_ms: u64,
    /// Screen capture timeout
    pub screenshot_ms: u64,
    /// Shell passthrough timeout
    pub shell_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            devices_ms: 5_000,
            input_ms: 10_000,
            query_ms: 10_000,
            screenshot_ms: 15_000,
            shell_ms: 15_000,
        }
    }
}

impl TimeoutSettings {
    /// Timeout for a command class.
    pub fn for_class(&self, class: TimeoutClass) -> Duration {
        let ms = match class {
            TimeoutClass::Devices => self.devices_ms,
            TimeoutClass::Input => self.input_ms,
            TimeoutClass::Query => self.query_ms,
            TimeoutClass::Screenshot => self.screenshot_ms,
            TimeoutClass::Shell => self.shell_ms,
        };
        Duration::from_millis(ms)
    }
}
