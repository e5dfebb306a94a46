//! Device session targets and invocation identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of one invocation, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Create a new random invocation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The device a command is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "selection", content = "serial", rename_all = "snake_case")]
pub enum SessionTarget {
    /// Serial configured by the operator
    Explicit(String),
    /// The only authorized device attached
    Implicit(String),
}

impl SessionTarget {
    /// Serial of the target device.
    pub fn serial(&self) -> &str {
        match self {
            SessionTarget::Explicit(serial) | SessionTarget::Implicit(serial) => serial,
        }
    }

    /// Whether the target came from an override.
    pub fn is_explicit(&self) -> bool {
        matches!(self, SessionTarget::Explicit(_))
    }

    /// Selector arguments placed before the bridge subcommand.
    pub fn selector_args(&self) -> [String; 2] {
        ["-s".to_string(), self.serial().to_string()]
    }
}

impl std::fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionTarget::Explicit(serial) => write!(f, "{serial} (explicit)"),
            SessionTarget::Implicit(serial) => write!(f, "{serial} (sole device)"),
        }
    }
}

/// Connection state reported by the device list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Connected and authorized
    Device,
    /// Connected but the host key is not accepted yet
    Unauthorized,
    /// Known but not responding
    Offline,
    /// Any other state (recovery, sideload, bootloader, ...)
    Other(String),
}

impl DeviceState {
    fn parse(s: &str) -> Self {
        match s {
            "device" => DeviceState::Device,
            "unauthorized" => DeviceState::Unauthorized,
            "offline" => DeviceState::Offline,
            other => DeviceState::Other(other.to_string()),
        }
    }

    /// Name as printed by the bridge.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Device => "device",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Offline => "offline",
            DeviceState::Other(s) => s,
        }
    }
}

/// One line of the device list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Device serial
    pub serial: String,
    /// Connection state
    pub state: DeviceState,
}

impl DeviceEntry {
    /// Whether commands can be sent to this device.
    pub fn is_authorized(&self) -> bool {
        self.state == DeviceState::Device
    }

    /// Parse the output of `adb devices`.
    ///
    /// The header line, daemon notices (`* daemon started ...`) and blank
    /// lines are skipped. Extra columns from `-l` are ignored.
    pub fn parse_list(output: &str) -> Vec<DeviceEntry> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty() && !line.starts_with('*') && !line.starts_with("List of devices")
            })
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let serial = parts.next()?;
                let state = parts.next()?;
                Some(DeviceEntry {
                    serial: serial.to_string(),
                    state: DeviceState::parse(state),
                })
            })
            .collect()
    }
}

impl std::fmt::Display for DeviceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.serial, self.state.as_str())
    }
}
