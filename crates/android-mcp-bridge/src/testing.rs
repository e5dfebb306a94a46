//! Scripted command runner for tests.
//!
//! [`ScriptedRunner`] answers each request with the reply of the first rule
//! whose needle occurs in the joined argument list, and records every request
//! together with start/finish events so tests can check ordering.

use std::sync::Mutex;
use std::time::Duration;

use android_mcp_core::{Error, Result};

use crate::executor::{CommandRequest, CommandRunner, ProcessOutput};

/// Scripted answer to a request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Process ran and produced this output
    Output(ProcessOutput),
    /// Process exceeded its timeout
    Timeout,
    /// Executable missing
    NotFound,
}

impl Reply {
    /// Successful exit with text stdout.
    pub fn stdout(text: &str) -> Self {
        Self::bytes(text.as_bytes().to_vec())
    }

    /// Successful exit with binary stdout.
    pub fn bytes(stdout: Vec<u8>) -> Self {
        Reply::Output(ProcessOutput {
            exit_code: Some(0),
            stdout,
            stderr: Vec::new(),
        })
    }

    /// Non-zero exit with stderr.
    pub fn failure(exit_code: i32, stderr: &str) -> Self {
        Reply::Output(ProcessOutput {
            exit_code: Some(exit_code),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }

    /// Arbitrary exit code, stdout and stderr.
    pub fn output(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Reply::Output(ProcessOutput {
            exit_code: Some(exit_code),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }
}

/// Lifecycle event of a scripted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// Run with this call index started
    Started(usize),
    /// Run with this call index finished
    Finished(usize),
}

/// In-memory [`CommandRunner`] that replays scripted replies.
#[derive(Debug)]
pub struct ScriptedRunner {
    rules: Vec<(String, Reply)>,
    fallback: Reply,
    delay: Option<Duration>,
    calls: Mutex<Vec<CommandRequest>>,
    events: Mutex<Vec<RunEvent>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRunner {
    /// Runner whose unmatched requests succeed with empty output.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Reply::stdout(""),
            delay: None,
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Runner that reports a single attached device.
    pub fn with_device(serial: &str) -> Self {
        Self::new().on(
            "devices",
            Reply::stdout(&format!("List of devices attached\n{serial}\tdevice\n")),
        )
    }

    /// Answer requests containing `needle` with `reply`. Earlier rules win.
    pub fn on(mut self, needle: &str, reply: Reply) -> Self {
        self.rules.push((needle.to_string(), reply));
        self
    }

    /// Answer unmatched requests with `reply`.
    pub fn otherwise(mut self, reply: Reply) -> Self {
        self.fallback = reply;
        self
    }

    /// Make every run take this long.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<CommandRequest> {
        lock(&self.calls).clone()
    }

    /// Argument vectors received so far.
    pub fn argv(&self) -> Vec<Vec<String>> {
        lock(&self.calls).iter().map(|c| c.args.clone()).collect()
    }

    /// Start/finish events so far.
    pub fn events(&self) -> Vec<RunEvent> {
        lock(&self.events).clone()
    }

    fn reply_for(&self, request: &CommandRequest) -> Reply {
        let joined = request.args.join(" ");
        self.rules
            .iter()
            .find(|(needle, _)| joined.contains(needle.as_str()))
            .map_or_else(|| self.fallback.clone(), |(_, reply)| reply.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, request: &CommandRequest) -> Result<ProcessOutput> {
        let index = {
            let mut calls = lock(&self.calls);
            calls.push(request.clone());
            calls.len() - 1
        };
        lock(&self.events).push(RunEvent::Started(index));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        lock(&self.events).push(RunEvent::Finished(index));

        match self.reply_for(request) {
            Reply::Output(output) => Ok(output),
            Reply::Timeout => Err(Error::Timeout {
                command: request.command_line(),
                timeout_ms: request.timeout.as_millis() as u64,
            }),
            Reply::NotFound => Err(Error::ExecutableNotFound(
                request.program.display().to_string(),
            )),
        }
    }
}
