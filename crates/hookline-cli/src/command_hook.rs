//! Hooks backed by external shell commands.
//!
//! The command receives `{"options", "point", "store"}` as JSON on stdin.
//! Its stdout becomes the hook result: parsed as JSON when possible, else
//! the trimmed text, and `null` when empty. A non-zero exit fails the hook.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use hookline_core::config::commands::CommandConfig;
use hookline_lifecycle::{HookError, HookExec, Store};

/// Payload written to the command's stdin.
#[derive(Debug, Serialize)]
struct CommandInput<'a> {
    options: &'a Value,
    point: &'a str,
    store: &'a Store,
}

/// Runs `<shell> -c <command>` as a hook.
#[derive(Debug, Clone)]
pub struct CommandExec {
    /// Hook name, exported as `HOOKLINE_HOOK`.
    hook: String,
    /// Command line passed to the shell.
    command: String,
    /// Shell interpreter.
    shell: String,
    /// Working directory, defaults to the current one.
    working_dir: Option<PathBuf>,
    /// Whether stderr is forwarded instead of captured.
    inherit_stderr: bool,
}

impl CommandExec {
    /// Creates a command hook using the shell settings from `config`.
    pub fn new(hook: &str, command: &str, config: &CommandConfig) -> Self {
        Self {
            hook: hook.to_string(),
            command: command.to_string(),
            shell: config.shell.clone(),
            working_dir: None,
            inherit_stderr: config.inherit_stderr,
        }
    }

    /// Sets the working directory.
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

#[async_trait]
impl HookExec for CommandExec {
    async fn execute(
        &self,
        options: &Value,
        point: &str,
        store: &Store,
    ) -> Result<Value, HookError> {
        let input = serde_json::to_vec(&CommandInput {
            options,
            point,
            store,
        })?;

        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if self.inherit_stderr {
                Stdio::inherit()
            } else {
                Stdio::piped()
            })
            .env("HOOKLINE_POINT", point)
            .env("HOOKLINE_HOOK", &self.hook);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(point = %point, hook = %self.hook, command = %self.command, "Spawning command hook");

        let mut child = command
            .spawn()
            .map_err(|e| format!("failed to spawn `{}`: {e}", self.command))?;

        // Stdin is fed while output is drained so neither pipe can fill up and stall.
        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            // Commands that never read stdin close the pipe early.
            match stdin.write_all(&input).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        fed?;
        let output = output?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(format!("`{}` exited with {}: {detail}", self.command, output.status).into());
        }

        Ok(parse_stdout(&stdout))
    }
}

fn parse_stdout(stdout: &str) -> Value {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}
