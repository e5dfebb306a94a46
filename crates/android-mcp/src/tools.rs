//! MCP tool catalogue and response envelopes.
//!
//! Tools are generated from the operation catalogue; parameter records and
//! their schemas live in `android_mcp_core::operation`.

use std::sync::Arc;

use android_mcp_bridge::ToolOutput;
use android_mcp_core::{Error, Operation};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rmcp::model::{CallToolResult, Content, ErrorCode, JsonObject, Tool};
use rmcp::ErrorData as McpError;
use serde_json::{json, Value};

use crate::schema::SchemaTransformer;

/// JSON-RPC code for a malformed call.
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC code for a failure while serving a valid call.
pub const INTERNAL_ERROR: i32 = -32603;

/// Input schema of an operation, rewritten for MCP clients.
pub fn input_schema(operation: Operation) -> JsonObject {
    SchemaTransformer::transform(operation.input_schema())
}

/// Tool descriptor of an operation.
pub fn tool(operation: Operation) -> Tool {
    Tool::new(
        operation.name(),
        operation.description(),
        Arc::new(input_schema(operation)),
    )
}

/// Every tool, in catalogue order.
pub fn tool_catalogue() -> Vec<Tool> {
    Operation::ALL.into_iter().map(tool).collect()
}

/// Wrap an operation's output in an MCP result.
///
/// Images travel base64-encoded; records are pretty-printed JSON.
pub fn into_call_result(output: ToolOutput) -> CallToolResult {
    let content = match output {
        ToolOutput::Image { data, mime_type } => Content::image(STANDARD.encode(&data), mime_type),
        ToolOutput::Json(value) => Content::text(
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        ),
        ToolOutput::Text(text) => Content::text(text),
    };
    CallToolResult::success(vec![content])
}

/// Convert an error into a structured MCP error.
///
/// Caller mistakes map to -32602, everything else to -32603. `data` carries
/// the error kind, the operation and, where relevant, the offending field,
/// exit code and stderr.
pub fn to_mcp_error(operation: &str, err: &Error) -> McpError {
    let code = if err.is_caller_error() {
        INVALID_PARAMS
    } else {
        INTERNAL_ERROR
    };

    let mut data = json!({
        "kind": err.kind(),
        "operation": operation,
        "message": err.to_string(),
    });
    match err {
        Error::InvalidParameters { field, .. } => {
            data["field"] = Value::from(field.as_str());
        }
        Error::BridgeExecutionFailed { exit_code, stderr } => {
            data["exit_code"] = json!(exit_code);
            data["stderr"] = Value::from(stderr.as_str());
        }
        Error::AmbiguousDevice { serials } => {
            data["serials"] = json!(serials);
        }
        Error::Timeout { timeout_ms, .. } => {
            data["timeout_ms"] = json!(timeout_ms);
        }
        _ => {}
    }

    McpError::new(ErrorCode(code), err.to_string(), Some(data))
}
