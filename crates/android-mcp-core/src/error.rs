//! Error types for the Android MCP Server.

use thiserror::Error;

/// Longest stderr excerpt carried inside an error.
pub const STDERR_SNIPPET_LIMIT: usize = 2000;

/// Main error type for Android MCP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The bridge executable could not be located or spawned
    #[error("Bridge executable not found: {0}")]
    ExecutableNotFound(String),

    /// No authorized device is attached
    #[error("No device attached: {0}")]
    NoDeviceAttached(String),

    /// Several devices are attached and no target override is configured
    #[error(
        "Multiple devices attached ({}); set ADB_SERIAL, --serial or bridge.serial to pick one",
        .serials.join(", ")
    )]
    AmbiguousDevice {
        /// Serials of the authorized devices
        serials: Vec<String>,
    },

    /// The bridge process did not finish in time and was killed
    #[error("Timed out after {timeout_ms}ms running: {command}")]
    Timeout {
        /// Command line that was running
        command: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// No operation with this name exists
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A parameter is missing or fails validation
    #[error("Invalid parameter '{field}' for {operation}: {reason}")]
    InvalidParameters {
        /// Operation being invoked
        operation: String,
        /// Offending parameter name
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Key name has no entry in the key table
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Bridge output could not be interpreted
    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    /// Bridge produced no output at all
    #[error("No data: {0}")]
    NoData(String),

    /// The bridge reports no launchable activity for a package
    #[error("Package not found or not launchable: {0}")]
    PackageNotFound(String),

    /// The bridge exited unsuccessfully
    #[error("Bridge command failed (exit code {}): {stderr}", display_exit_code(*.exit_code))]
    BridgeExecutionFailed {
        /// Exit code, absent when the process was killed by a signal
        exit_code: Option<i32>,
        /// Captured stderr, truncated
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn display_exit_code(code: Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl Error {
    /// Build a `BridgeExecutionFailed` from raw stderr bytes.
    pub fn bridge_failed(exit_code: Option<i32>, stderr: &[u8]) -> Self {
        Error::BridgeExecutionFailed {
            exit_code,
            stderr: stderr_snippet(stderr),
        }
    }

    /// Build an `InvalidParameters` error.
    pub fn invalid_param(
        operation: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameters {
            operation: operation.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ExecutableNotFound(_) => "ExecutableNotFound",
            Error::NoDeviceAttached(_) => "NoDeviceAttached",
            Error::AmbiguousDevice { .. } => "AmbiguousDevice",
            Error::Timeout { .. } => "Timeout",
            Error::UnknownOperation(_) => "UnknownOperation",
            Error::InvalidParameters { .. } => "InvalidParameters",
            Error::UnknownKey(_) => "UnknownKey",
            Error::MalformedOutput(_) => "MalformedOutput",
            Error::NoData(_) => "NoData",
            Error::PackageNotFound(_) => "PackageNotFound",
            Error::BridgeExecutionFailed { .. } => "BridgeExecutionFailed",
            Error::Io(_) => "Io",
            Error::Config(_) => "Config",
            Error::Serialization(_) => "Serialization",
        }
    }

    /// Whether the caller sent a bad request (as opposed to a device or bridge failure).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownOperation(_) | Error::InvalidParameters { .. } | Error::UnknownKey(_)
        )
    }
}

/// Decode stderr lossily, trim it and cap it at [`STDERR_SNIPPET_LIMIT`] characters.
pub fn stderr_snippet(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.chars().count() <= STDERR_SNIPPET_LIMIT {
        return text.to_string();
    }
    let mut snippet: String = text.chars().take(STDERR_SNIPPET_LIMIT).collect();
    snippet.push_str("...");
    snippet
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
