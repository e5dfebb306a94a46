//! Android MCP Server Implementation
//!
//! Implements `rmcp::ServerHandler` over the fixed operation catalogue. Tool
//! listing comes from `crate::tools`; every call goes through the bridge
//! dispatcher, which serializes device access.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use tracing::{debug, error, info, instrument};

use android_mcp_bridge::{CommandRunner, Dispatcher, ProcessExecutor};
use android_mcp_core::ServerConfig;

use crate::tools::{into_call_result, to_mcp_error, tool_catalogue};

/// Android MCP Server
///
/// Owns the immutable tool catalogue and the dispatcher. Cloning shares both.
pub struct AndroidMcpServer<R: CommandRunner = ProcessExecutor> {
    /// Pipeline that runs invocations against the device
    dispatcher: Arc<Dispatcher<R>>,
    /// Tool descriptors, built once at startup
    tools: Arc<Vec<Tool>>,
}

impl<R: CommandRunner> Clone for AndroidMcpServer<R> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            tools: Arc::clone(&self.tools),
        }
    }
}

impl AndroidMcpServer<ProcessExecutor> {
    /// Create a server driving the adb executable at `adb`.
    pub fn new(adb: impl Into<PathBuf>, config: &ServerConfig) -> Self {
        Self::with_runner(ProcessExecutor::new(), adb, config)
    }
}

impl<R: CommandRunner> AndroidMcpServer<R> {
    /// Create a server that runs bridge commands through `runner`.
    pub fn with_runner(runner: R, adb: impl Into<PathBuf>, config: &ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(runner, adb, config)),
            tools: Arc::new(tool_catalogue()),
        }
    }

    /// The dispatcher behind this server.
    pub fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    /// Tool descriptors advertised by `tools/list`.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.as_ref().clone()
    }

    /// Handle one `tools/call` request.
    #[instrument(skip_all, fields(tool = %name))]
    pub async fn handle_call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = arguments.unwrap_or_default();
        debug!(argument_count = arguments.len(), "Tool call received");

        match self.dispatcher.call(name, &arguments).await {
            Ok(output) => Ok(into_call_result(output)),
            Err(e) => {
                if e.is_caller_error() {
                    info!("Rejected tool call: {}", e);
                } else {
                    error!("Tool call failed: {}", e);
                }
                Err(to_mcp_error(name, &e))
            }
        }
    }
}

impl<R: CommandRunner + 'static> rmcp::ServerHandler for AndroidMcpServer<R> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Android MCP Server - Control an Android device through adb. \
                 Use screenshot to see the screen, tap/swipe/type_text/press_key to interact, \
                 launch_app and get_current_app to manage apps, and get_device_info for device details. \
                 Coordinates are in screen pixels; call get_screen_size to learn the bounds."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.handle_call(&request.name, request.arguments).await
    }
}
