// Statica - static website hosting over HTTP, powered by Pulumi
// Copyright (C) 2025 Statica Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Pulumi CLI engine.
//!
//! Wraps the `pulumi` binary: every stack operation stages a workspace,
//! runs the CLI non-interactively inside it, and turns the stderr the CLI
//! prints for known conditions (duplicate stack, missing stack, held
//! update lock) into typed errors. Long-running commands stream their
//! progress lines into the log as they arrive.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use statica_core::SiteProgram;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::engine::{StackEngine, StackHandle, StackOutputs, StackSummary};
use crate::error::EngineError;
use crate::workspace::StackWorkspace;

/// Settings for the Pulumi CLI engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project every stack belongs to.
    pub project: String,
    /// Binary to invoke, resolved through `PATH` unless absolute.
    pub pulumi_bin: String,
    /// State backend override, exported as `PULUMI_BACKEND_URL`.
    pub backend_url: Option<String>,
    /// Secrets passphrase, exported as `PULUMI_CONFIG_PASSPHRASE`.
    pub passphrase: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project: "statica".to_string(),
            pulumi_bin: "pulumi".to_string(),
            backend_url: None,
            passphrase: None,
        }
    }
}

/// Stack engine backed by the Pulumi CLI.
#[derive(Debug, Clone)]
pub struct PulumiEngine {
    config: EngineConfig,
}

impl PulumiEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.config.pulumi_bin, args.join(" "))
    }

    fn command(&self, dir: Option<&Path>, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.config.pulumi_bin);
        cmd.args(args);
        cmd.arg("--non-interactive");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd.env("PULUMI_SKIP_UPDATE_CHECK", "true");
        if let Some(url) = &self.config.backend_url {
            cmd.env("PULUMI_BACKEND_URL", url);
        }
        if let Some(passphrase) = &self.config.passphrase {
            cmd.env("PULUMI_CONFIG_PASSPHRASE", passphrase);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Cancelled requests must not leave deploys running half-watched.
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run a command to completion and return its stdout.
    async fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<String, EngineError> {
        let command_line = self.command_line(args);
        tracing::debug!("running: {}", command_line);

        let output = self
            .command(dir, args)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EngineError::CommandFailed {
                command: command_line,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command, forwarding each line it prints into the log while it
    /// works. Used for `up` and `destroy`, which can take minutes.
    async fn run_streaming(&self, dir: &Path, args: &[&str]) -> Result<(), EngineError> {
        let command_line = self.command_line(args);
        tracing::debug!("running: {}", command_line);

        let mut child =
            self.command(Some(dir), args)
                .spawn()
                .map_err(|source| EngineError::Spawn {
                    command: command_line.clone(),
                    source,
                })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!("pulumi: {}", line);
                }
            }
        });

        let stderr_task = tokio::spawn(async move {
            let mut collected = String::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!("pulumi: {}", line);
                    collected.push_str(&line);
                    collected.push('\n');
                }
            }
            collected
        });

        let status = child.wait().await.map_err(|source| EngineError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let _ = stdout_task.await;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(EngineError::CommandFailed {
                command: command_line,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StackEngine for PulumiEngine {
    async fn create_stack(
        &self,
        name: &str,
        program: &SiteProgram,
    ) -> Result<Box<dyn StackHandle>, EngineError> {
        let workspace = StackWorkspace::stage(&self.config.project, Some(program)).await?;
        self.run(Some(workspace.path()), &["stack", "init", name])
            .await
            .map_err(|e| classify_create_failure(name, e))?;

        Ok(Box::new(PulumiStack {
            engine: self.clone(),
            name: name.to_string(),
            workspace,
        }))
    }

    async fn select_stack(
        &self,
        name: &str,
        program: Option<&SiteProgram>,
    ) -> Result<Box<dyn StackHandle>, EngineError> {
        let workspace = StackWorkspace::stage(&self.config.project, program).await?;
        self.run(Some(workspace.path()), &["stack", "select", name])
            .await
            .map_err(|e| classify_select_failure(name, e))?;

        Ok(Box::new(PulumiStack {
            engine: self.clone(),
            name: name.to_string(),
            workspace,
        }))
    }

    async fn list_stacks(&self) -> Result<Vec<StackSummary>, EngineError> {
        let workspace = StackWorkspace::stage(&self.config.project, None).await?;
        let args = ["stack", "ls", "--json"];
        let stdout = self.run(Some(workspace.path()), &args).await?;

        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&stdout).map_err(|source| EngineError::Decode {
            command: self.command_line(&args),
            source,
        })
    }

    async fn install_plugin(&self, name: &str, version: &str) -> Result<(), EngineError> {
        self.run(None, &["plugin", "install", "resource", name, version])
            .await?;
        Ok(())
    }

    async fn version(&self) -> Result<String, EngineError> {
        let stdout = self.run(None, &["version"]).await?;
        Ok(stdout.trim().to_string())
    }
}

/// Handle to one stack, pinned to the workspace it was opened in so
/// configuration written by `set_config` is seen by the following `up`.
struct PulumiStack {
    engine: PulumiEngine,
    name: String,
    workspace: StackWorkspace,
}

#[async_trait]
impl StackHandle for PulumiStack {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), EngineError> {
        let args = ["config", "set", key, value, "--stack", self.name.as_str()];
        self.engine
            .run(Some(self.workspace.path()), &args)
            .await?;
        Ok(())
    }

    async fn up(&self) -> Result<StackOutputs, EngineError> {
        let args = [
            "up",
            "--yes",
            "--skip-preview",
            "--stack",
            self.name.as_str(),
        ];
        self.engine
            .run_streaming(self.workspace.path(), &args)
            .await
            .map_err(|e| classify_update_failure(&self.name, e))?;

        self.outputs().await
    }

    async fn outputs(&self) -> Result<StackOutputs, EngineError> {
        let args = ["stack", "output", "--json", "--stack", self.name.as_str()];
        let stdout = self.engine.run(Some(self.workspace.path()), &args).await?;

        // A stack that has never deployed has no outputs at all.
        if stdout.trim().is_empty() {
            return Ok(StackOutputs::new());
        }
        serde_json::from_str(&stdout).map_err(|source| EngineError::Decode {
            command: self.engine.command_line(&args),
            source,
        })
    }

    async fn destroy(&self) -> Result<(), EngineError> {
        let args = ["destroy", "--yes", "--stack", self.name.as_str()];
        self.engine
            .run_streaming(self.workspace.path(), &args)
            .await
            .map_err(|e| classify_update_failure(&self.name, e))
    }

    async fn remove(self: Box<Self>) -> Result<(), EngineError> {
        let args = ["stack", "rm", "--yes", self.name.as_str()];
        self.engine
            .run(Some(self.workspace.path()), &args)
            .await?;
        Ok(())
    }
}

/// `stack init` on a taken name.
fn classify_create_failure(stack: &str, err: EngineError) -> EngineError {
    match err {
        EngineError::CommandFailed { command, stderr } => {
            if stderr.contains("already exists") {
                EngineError::StackAlreadyExists(stack.to_string())
            } else {
                EngineError::CommandFailed { command, stderr }
            }
        }
        other => other,
    }
}

/// `stack select` on a name that does not exist.
fn classify_select_failure(stack: &str, err: EngineError) -> EngineError {
    match err {
        EngineError::CommandFailed { command, stderr } => {
            if stderr.contains("no stack named") {
                EngineError::StackNotFound(stack.to_string())
            } else {
                EngineError::CommandFailed { command, stderr }
            }
        }
        other => other,
    }
}

/// `up` or `destroy` against a stack whose update lock is held. The cloud
/// backend reports this as an HTTP 409 conflict; DIY backends report a
/// held file lock.
fn classify_update_failure(stack: &str, err: EngineError) -> EngineError {
    match err {
        EngineError::CommandFailed { command, stderr } => {
            if stderr.contains("[409] Conflict: Another update is currently in progress")
                || stderr.contains("the stack is currently locked by")
            {
                EngineError::UpdateInProgress(stack.to_string())
            } else {
                EngineError::CommandFailed { command, stderr }
            }
        }
        other => other,
    }
}
