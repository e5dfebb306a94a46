//! Dispatcher: resolve → encode → execute → decode, one invocation at a time.

use std::path::{Path, PathBuf};
use std::time::Instant;

use android_mcp_core::{
    Error, Invocation, InvocationId, Result, ScreenSize, ServerConfig, SessionTarget,
    TimeoutSettings,
};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::decoder::{decode, parse_screen_size, require_text, Decoded};
use crate::encoder::encode;
use crate::executor::{CommandRunner, ProcessExecutor};
use crate::session::SessionResolver;

/// MIME type of screenshots.
pub const PNG_MIME_TYPE: &str = "image/png";

/// Response payload of an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain text
    Text(String),
    /// Structured record
    Json(Value),
    /// Binary image
    Image {
        /// Raw image bytes
        data: Vec<u8>,
        /// MIME type of `data`
        mime_type: &'static str,
    },
}

impl ToolOutput {
    /// Convert a decoded result into a response payload.
    pub fn from_decoded(decoded: Decoded) -> Result<Self> {
        let output = match decoded {
            Decoded::Image(data) => ToolOutput::Image {
                data,
                mime_type: PNG_MIME_TYPE,
            },
            Decoded::Shell(shell) => ToolOutput::Text(shell.render()),
            Decoded::ScreenSize(size) => ToolOutput::Json(serde_json::to_value(size)?),
            Decoded::Action(report) => ToolOutput::Json(serde_json::to_value(report)?),
            Decoded::CurrentApp(app) => ToolOutput::Json(serde_json::to_value(app)?),
            Decoded::InstalledApps(apps) => ToolOutput::Json(serde_json::to_value(apps)?),
            Decoded::DeviceInfo(info) => ToolOutput::Json(serde_json::to_value(info)?),
        };
        Ok(output)
    }
}

/// Runs invocations against the device.
///
/// Every invocation holds the device lock for its whole pipeline, so bridge
/// commands never overlap even when calls arrive concurrently.
#[derive(Debug)]
pub struct Dispatcher<R: CommandRunner = ProcessExecutor> {
    runner: R,
    bridge: PathBuf,
    resolver: SessionResolver,
    timeouts: TimeoutSettings,
    device_lock: Mutex<()>,
}

impl<R: CommandRunner> Dispatcher<R> {
    /// Create a dispatcher running `bridge` through `runner`.
    pub fn new(runner: R, bridge: impl Into<PathBuf>, config: &ServerConfig) -> Self {
        Self {
            runner,
            bridge: bridge.into(),
            resolver: SessionResolver::new(
                config.bridge.serial.clone(),
                config.timeouts.for_class(android_mcp_core::TimeoutClass::Devices),
            ),
            timeouts: config.timeouts.clone(),
            device_lock: Mutex::new(()),
        }
    }

    /// Path of the bridge executable.
    pub fn bridge(&self) -> &Path {
        &self.bridge
    }

    /// Session resolver.
    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Parse and run a named call.
    pub async fn call(&self, name: &str, args: &Map<String, Value>) -> Result<ToolOutput> {
        let invocation = Invocation::parse(name, args)?;
        self.dispatch(&invocation).await
    }

    /// Run an invocation and convert the result into a response payload.
    pub async fn dispatch(&self, invocation: &Invocation) -> Result<ToolOutput> {
        ToolOutput::from_decoded(self.execute(invocation).await?)
    }

    /// Run an invocation and return its typed result.
    pub async fn execute(&self, invocation: &Invocation) -> Result<Decoded> {
        self.execute_with_id(InvocationId::new(), invocation).await
    }

    #[instrument(skip_all, fields(id = %id, operation = %invocation.operation()))]
    async fn execute_with_id(&self, id: InvocationId, invocation: &Invocation) -> Result<Decoded> {
        let started = Instant::now();
        let result = self.run_pipeline(invocation).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(elapsed_ms, "Invocation finished"),
            Err(e) if e.is_caller_error() => debug!(elapsed_ms, error = %e, "Invocation rejected"),
            Err(e) => warn!(elapsed_ms, kind = e.kind(), error = %e, "Invocation failed"),
        }
        result
    }

    async fn run_pipeline(&self, invocation: &Invocation) -> Result<Decoded> {
        // Encode up front so bad input never reaches the device. Swipe needs
        // the screen size first and is encoded after that query.
        let prepared = match invocation {
            Invocation::Swipe(_) => None,
            _ => Some(encode(invocation, None)?),
        };

        let _device = self.device_lock.lock().await;

        let target = self.resolver.resolve(&self.runner, &self.bridge).await?;
        debug!(target = %target, "Resolved device");

        let command = match prepared {
            Some(command) => command,
            None => {
                let screen = self.query_screen_size(&target).await?;
                encode(invocation, Some(screen))?
            }
        };

        let request = command
            .clone()
            .into_request(&self.bridge, &target, &self.timeouts);
        let output = self.runner.run(&request).await?;

        decode(invocation, &command, output, target.serial())
    }

    /// Query the current screen size; never cached since rotation changes it.
    async fn query_screen_size(&self, target: &SessionTarget) -> Result<ScreenSize> {
        let command = encode(&Invocation::GetScreenSize, None)?;
        let request = command.into_request(&self.bridge, target, &self.timeouts);
        let output = self.runner.run(&request).await?;
        if !output.success() {
            return Err(Error::bridge_failed(output.exit_code, &output.stderr));
        }
        let screen = parse_screen_size(&require_text(&output, "wm size")?)?;
        debug!(screen = %screen, "Probed screen size");
        Ok(screen)
    }
}
