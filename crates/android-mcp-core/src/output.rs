//! Typed results returned by operations.

use serde::{Serialize, Serializer};

use crate::geometry::ScreenSize;

/// Sentinel written for fields the device did not report.
pub const UNKNOWN: &str = "unknown";

/// A field that may be absent from device output.
///
/// Serializes as the inner value, or as the string `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reported<T> {
    /// Value parsed from the device
    Known(T),
    /// Field absent or unrecognised
    Unknown,
}

impl<T> Reported<T> {
    /// Wrap an optional value.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Reported::Unknown, Reported::Known)
    }

    /// The known value, if any.
    pub fn known(&self) -> Option<&T> {
        match self {
            Reported::Known(v) => Some(v),
            Reported::Unknown => None,
        }
    }

    /// Whether the value was reported.
    pub fn is_known(&self) -> bool {
        matches!(self, Reported::Known(_))
    }
}

impl<T> Default for Reported<T> {
    fn default() -> Self {
        Reported::Unknown
    }
}

impl<T> From<Option<T>> for Reported<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reported::Known(v) => v.serialize(serializer),
            Reported::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

/// Outcome of an input or navigation operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    /// Operation name
    pub action: &'static str,
    /// What was sent to the device
    pub message: String,
}

/// Foreground activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrentApp {
    /// Package name
    pub package: Reported<String>,
    /// Activity class name
    pub activity: Reported<String>,
    /// Resumed-activity line as printed by the device
    pub raw: Reported<String>,
}

/// Third-party packages installed on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstalledApps {
    /// Number of packages
    pub count: usize,
    /// Package names, sorted
    pub packages: Vec<String>,
}

impl InstalledApps {
    /// Build from an unsorted package list.
    pub fn new(mut packages: Vec<String>) -> Self {
        packages.sort();
        packages.dedup();
        Self {
            count: packages.len(),
            packages,
        }
    }
}

/// Battery charging status (`BatteryManager.BATTERY_STATUS_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    /// Status 1
    Unknown,
    /// Status 2
    Charging,
    /// Status 3
    Discharging,
    /// Status 4
    NotCharging,
    /// Status 5
    Full,
}

impl BatteryStatus {
    /// Map a numeric status code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BatteryStatus::Unknown),
            2 => Some(BatteryStatus::Charging),
            3 => Some(BatteryStatus::Discharging),
            4 => Some(BatteryStatus::NotCharging),
            5 => Some(BatteryStatus::Full),
            _ => None,
        }
    }
}

/// Battery state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatteryInfo {
    /// Charge level in percent
    pub level: Reported<u8>,
    /// Charging status
    pub status: Reported<BatteryStatus>,
}

/// Device identity and state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Serial of the device that answered
    pub serial: String,
    /// Product model (`ro.product.model`)
    pub model: Reported<String>,
    /// Manufacturer (`ro.product.manufacturer`)
    pub manufacturer: Reported<String>,
    /// Android release (`ro.build.version.release`)
    pub android_version: Reported<String>,
    /// SDK level (`ro.build.version.sdk`)
    pub sdk: Reported<u32>,
    /// Effective screen size
    pub screen: Reported<ScreenSize>,
    /// Battery state
    pub battery: BatteryInfo,
}

/// Result of a shell passthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellOutput {
    /// Exit code of the bridge, absent when killed by a signal
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ShellOutput {
    /// Plain-text rendering: stdout, then stderr and a non-zero exit code when present.
    pub fn render(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("[stderr]\n");
            text.push_str(stderr);
        }
        match self.exit_code {
            Some(0) => {}
            Some(code) => text.push_str(&format!("\n[exit code {code}]")),
            None => text.push_str("\n[terminated by signal]"),
        }
        if text.is_empty() {
            text.push_str("(no output)");
        }
        text
    }
}
