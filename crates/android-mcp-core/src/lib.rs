//! # android-mcp-core
//!
//! Core types for the Android MCP Server.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other android-mcp crates. It provides:
//!
//! - The operation catalogue and typed invocations
//! - Key names and key-event codes
//! - Screen geometry and gesture synthesis
//! - Session targets and the device list
//! - Typed operation results
//! - Configuration and error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - the bridge and server crates depend
//! on this one, but this crate performs no I/O beyond reading a config file.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod key;
pub mod operation;
pub mod output;
pub mod session;

// Re-export commonly used types
pub use config::{
    BridgeSettings, ServerConfig, ServerSettings, TimeoutClass, TimeoutSettings, ENV_BRIDGE_PATH,
    ENV_SERIAL,
};
pub use error::{Error, Result};
pub use geometry::{Gesture, Point, ScreenSize, SwipeDirection, SWIPE_DEFAULT_DISTANCE};
pub use key::AndroidKey;
pub use operation::{Invocation, Operation, ParamKind, ParamSpec};
pub use output::{
    ActionReport, BatteryInfo, BatteryStatus, CurrentApp, DeviceInfo, InstalledApps, Reported,
    ShellOutput,
};
pub use session::{DeviceEntry, DeviceState, InvocationId, SessionTarget};
