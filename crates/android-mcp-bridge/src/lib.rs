//! # android-mcp-bridge
//!
//! Command bridge between MCP tool calls and `adb`.
//!
//! This crate provides:
//!
//! - Process execution with timeouts ([`ProcessExecutor`])
//! - Bridge discovery (`PATH`, `ANDROID_HOME`, `ANDROID_SDK_ROOT`)
//! - Per-invocation device resolution ([`SessionResolver`])
//! - Encoding invocations into argument vectors ([`encoder`])
//! - Decoding raw output into typed results ([`decoder`])
//! - The serialized dispatch pipeline ([`Dispatcher`])
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture. It depends on `android-mcp-core` and
//! is used by the `android-mcp` server.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod discovery;
pub mod dispatcher;
pub mod encoder;
pub mod executor;
pub mod session;
pub mod testing;

pub use decoder::Decoded;
pub use discovery::{locate_bridge, locate_bridge_with};
pub use dispatcher::{Dispatcher, ToolOutput};
pub use encoder::{encode, escape_text, BridgeCommand};
pub use executor::{CaptureMode, CommandRequest, CommandRunner, ProcessExecutor, ProcessOutput};
pub use session::SessionResolver;
