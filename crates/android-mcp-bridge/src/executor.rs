//! Process executor: runs the bridge with an argument vector and a timeout.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use android_mcp_core::{Error, Result};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How the caller intends to interpret stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Output is text (decoded lossily)
    Text,
    /// Output is an opaque binary payload
    Binary,
}

/// One external process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Executable to run
    pub program: PathBuf,
    /// Arguments, passed as a vector and never joined into a host shell string
    pub args: Vec<String>,
    /// Kill the process after this long
    pub timeout: Duration,
    /// How stdout will be interpreted
    pub capture: CaptureMode,
}

impl CommandRequest {
    /// Create a text-capturing request.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            capture: CaptureMode::Text,
        }
    }

    /// Switch the capture mode.
    pub fn with_capture(mut self, capture: CaptureMode) -> Self {
        self.capture = capture;
        self
    }

    /// Printable command line, for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
                line.push_str(&format!("{arg:?}"));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, absent when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Raw stdout bytes
    pub stdout: Vec<u8>,
    /// Raw stderr bytes
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands.
///
/// A non-zero exit is returned as data; only spawn failures and timeouts are errors.
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    fn run(&self, request: &CommandRequest) -> impl Future<Output = Result<ProcessOutput>> + Send;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessExecutor {
    async fn run(&self, request: &CommandRequest) -> Result<ProcessOutput> {
        let started = Instant::now();
        debug!(
            command = %request.command_line(),
            timeout_ms = request.timeout.as_millis() as u64,
            "Spawning bridge"
        );

        let child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::ExecutableNotFound(format!(
                    "{}: {e}",
                    request.program.display()
                )),
                std::io::ErrorKind::PermissionDenied => Error::ExecutableNotFound(format!(
                    "{} is not executable: {e}",
                    request.program.display()
                )),
                _ => Error::Io(e),
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match timeout(request.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = ProcessOutput {
                    exit_code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                };
                debug!(
                    exit_code = ?result.exit_code,
                    stdout_bytes = result.stdout.len(),
                    stderr_bytes = result.stderr.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Bridge exited"
                );
                Ok(result)
            }
            Ok(Err(e)) => Err(Error::Io(e)),
            Err(_) => {
                warn!(command = %request.command_line(), "Bridge timed out, killed");
                Err(Error::Timeout {
                    command: request.command_line(),
                    timeout_ms: request.timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn request(program: &str, args: &[&str]) -> CommandRequest {
        CommandRequest::new(
            program,
            args.iter().map(|s| s.to_string()).collect(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_arguments_arrive_verbatim() {
        let args = [
            "%s\n",
            "two words",
            "$(reboot)",
            "a;b|c&d",
            "'quoted' \"double\"",
            "*.png",
            "",
        ];
        let output = ProcessExecutor::new()
            .run(&request("printf", &args))
            .await
            .unwrap();

        assert!(output.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.split('\n').collect();
        assert_eq!(&lines[..6], &args[1..]);
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let mut req = request("sleep", &["10"]);
        req.timeout = Duration::from_millis(200);

        let started = Instant::now();
        let err = ProcessExecutor::new().run(&req).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 200, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let err = ProcessExecutor::new()
            .run(&request("/nonexistent/bin/adb-missing", &["devices"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExecutableNotFound(_)));
        assert_eq!(err.kind(), "ExecutableNotFound");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_data() {
        let output = ProcessExecutor::new()
            .run(&request("sh", &["-c", "echo partial; echo oops >&2; exit 3"]))
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, b"partial\n");
        assert_eq!(output.stderr, b"oops\n");
    }

    #[tokio::test]
    async fn test_binary_stdout_untouched() {
        let req = request("printf", &["\\211PNG\\r\\n\\032\\n\\000\\377"])
            .with_capture(CaptureMode::Binary);
        let output = ProcessExecutor::new().run(&req).await.unwrap();
        assert_eq!(
            output.stdout,
            [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0x00, 0xff]
        );
    }

    #[test]
    fn test_command_line_display() {
        let req = request("adb", &["shell", "input text 'a b'"]);
        assert_eq!(req.command_line(), "adb shell \"input text 'a b'\"");
    }
}
