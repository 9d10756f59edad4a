//! Type-safe builder for git command execution.
//!
//! Every git invocation in cuco goes through [`GitCommand`]: commands run
//! asynchronously through `tokio::process`, are logged under the `git` tracing
//! target, carry a timeout, and map failures onto [`CucoError`] variants.
//! Interactive credential prompts are disabled so an unreachable remote fails
//! instead of waiting for input.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cuco_cli::git::command_builder::GitCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! GitCommand::clone("https://github.com/acme/resources.git", "/tmp/acme")
//!     .with_context("acme")
//!     .execute_success()
//!     .await?;
//!
//! let head = GitCommand::rev_parse("HEAD").current_dir("/tmp/acme").execute_stdout().await?;
//! println!("at {head}");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::{GIT_CLONE_TIMEOUT, GIT_FETCH_TIMEOUT};
use crate::core::CucoError;
use crate::utils::platform::get_git_command;

/// Builder for a single git invocation.
///
/// Defaults: five minute timeout, captured output, process working directory.
pub struct GitCommand {
    /// Arguments after `git` (and after `-C <dir>`)
    args: Vec<String>,

    /// Directory passed through `-C`
    current_dir: Option<PathBuf>,

    /// Extra environment for the git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Label prefixed to log lines
    context: Option<String>,

    /// For clone commands, the URL for error messages
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())],
            timeout_duration: Some(Duration::from_secs(300)),
            context: None,
            clone_url: None,
        }
    }
}

impl GitCommand {
    /// Creates an empty command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the command in `dir` (passed as `git -C <dir>`).
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the git process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Overrides the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label for log lines, usually the source name.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Executes the command and returns its output.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(dir) = &self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        cmd.args(&full_args);

        let label = self.context.as_deref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();
        tracing::debug!(target: "git", "{label}Executing command: {git_command} {}", full_args.join(" "));

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let operation = self.args.first().cloned().unwrap_or_else(|| "unknown".to_string());
        let output_future = cmd.output();

        let output = match self.timeout_duration {
            Some(duration) => match timeout(duration, output_future).await {
                Ok(result) => map_spawn_error(result, &full_args)?,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "{label}Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(CucoError::GitCommandError {
                        operation,
                        stderr: format!(
                            "Git command timed out after {} seconds.\n\
                            Check network connectivity and repository access.\n\
                            Try running the command manually: git {}",
                            duration.as_secs(),
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            },
            None => map_spawn_error(output_future.await, &full_args)?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "{label}Command failed with exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            );

            let message = if stderr.trim().is_empty() { stdout } else { stderr };
            let error = if operation == "clone" {
                CucoError::GitCloneFailed {
                    url: self.clone_url.unwrap_or_else(|| "unknown".to_string()),
                    reason: message,
                }
            } else {
                CucoError::GitCommandError {
                    operation,
                    stderr: message,
                }
            };
            return Err(error.into());
        }

        if !stdout.trim().is_empty() {
            tracing::trace!(target: "git", "{label}{}", stdout.trim());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Executes the command and returns trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Executes the command, discarding output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

fn map_spawn_error(
    result: std::io::Result<std::process::Output>,
    full_args: &[String],
) -> Result<std::process::Output> {
    match result {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CucoError::GitNotFound.into()),
        Err(e) => Err(e).context(format!("Failed to execute git {}", full_args.join(" "))),
    }
}

/// Output from a git command.
#[derive(Debug)]
pub struct GitCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl GitCommand {
    /// `git clone <url> <target>`
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        let mut cmd = Self::new()
            .args(["clone", "--quiet", url])
            .arg(target.as_ref().display().to_string())
            .with_timeout(Some(GIT_CLONE_TIMEOUT));
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// `git pull --ff-only`
    #[must_use]
    pub fn pull_fast_forward() -> Self {
        Self::new().args(["pull", "--ff-only", "--quiet"]).with_timeout(Some(GIT_FETCH_TIMEOUT))
    }

    /// `git rev-parse <ref>`
    #[must_use]
    pub fn rev_parse(reference: &str) -> Self {
        Self::new().args(["rev-parse", reference])
    }

    /// `git remote get-url origin`
    #[must_use]
    pub fn remote_url() -> Self {
        Self::new().args(["remote", "get-url", "origin"])
    }
}
