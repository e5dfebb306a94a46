//! # Android MCP Server
//!
//! Model Context Protocol server that lets AI agents drive an Android device
//! through `adb`.
//!
//! ## Overview
//!
//! This server provides MCP tools for:
//! - Screen capture and screen size
//! - Input injection (tap, swipe, drag, text, keys)
//! - App management (launch, current app, installed apps)
//! - Shell passthrough and device information
//!
//! ## Architecture
//!
//! This is Layer 2 - the main MCP server binary that ties together:
//! - android-mcp-core: Core types
//! - android-mcp-bridge: adb execution, device resolution, encoding, decoding

use android_mcp::{AndroidMcpServer, CliArgs};
use android_mcp_bridge::locate_bridge;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = CliArgs::parse();
    let config = args.load_config(|key| std::env::var(key).ok())?;

    // Initialize logging; stdout belongs to the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "Android MCP Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let adb = locate_bridge(config.bridge.executable.as_deref()).map_err(|e| {
        tracing::error!("{}", e);
        e
    })?;
    tracing::info!(adb = %adb.display(), "Using adb");
    match &config.bridge.serial {
        Some(serial) => tracing::info!(serial = %serial, "Targeting configured device"),
        None => tracing::info!("No serial configured, expecting a single attached device"),
    }

    let server = AndroidMcpServer::new(adb, &config);

    tracing::info!("Server initialized, starting stdio transport...");

    // Serve the MCP server over stdio
    let service = server.serve(stdio()).await.map_err(|e| {
        tracing::error!("Error starting server: {}", e);
        e
    })?;

    tracing::info!("Android MCP Server running on stdio");

    // Wait for the service to complete
    service.waiting().await?;

    tracing::info!("Android MCP Server shutting down");

    Ok(())
}
