//! Command-line flags and configuration loading.
//!
//! Precedence, lowest to highest: built-in defaults, `--config` YAML file,
//! environment (`ADB_PATH`, `ADB_SERIAL`), `--adb` / `--serial` flags.

use std::path::PathBuf;

use android_mcp_core::{Error, Result, ServerConfig};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

/// Command-line flags.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "android-mcp", version)]
#[command(about = "MCP server (stdio) for controlling an Android device through adb", long_about = None)]
#[command(after_help = "Logging goes to stderr; set RUST_LOG to override server.log_level.")]
pub struct CliArgs {
    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// adb executable (overrides ADB_PATH and bridge.executable)
    #[arg(long, value_name = "PATH", value_parser = NonEmptyStringValueParser::new())]
    pub adb: Option<String>,

    /// Target device serial (overrides ADB_SERIAL and bridge.serial)
    #[arg(long, value_name = "SERIAL", value_parser = NonEmptyStringValueParser::new())]
    pub serial: Option<String>,
}

impl CliArgs {
    /// Build the effective configuration from all sources.
    pub fn load_config<F>(&self, env: F) -> Result<ServerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path).map_err(|e| match e {
                Error::Io(io) => Error::Config(format!("cannot read {}: {io}", path.display())),
                other => other,
            })?,
            None => ServerConfig::default(),
        };

        config.apply_overrides(env);

        if let Some(adb) = &self.adb {
            config.bridge.executable = Some(adb.clone());
        }
        if let Some(serial) = &self.serial {
            config.bridge.serial = Some(serial.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
