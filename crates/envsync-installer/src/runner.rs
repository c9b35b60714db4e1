use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::Invocation;

/// Executes package-manager invocations.
pub trait CommandRunner {
    /// Runs with inherited stdio; a non-zero exit is an error.
    fn run(&mut self, invocation: &Invocation) -> Result<()>;

    /// Runs and returns captured stdout; a non-zero exit is an error.
    fn capture(&mut self, invocation: &Invocation) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        info!(command = %invocation, "running package manager");
        let status = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| {
                format!(
                    "{} {} failed to start",
                    invocation.program,
                    invocation.operation()
                )
            })?;
        if status.success() {
            return Ok(());
        }

        Err(anyhow!(
            "{} {} failed: status={} command='{}'",
            invocation.program,
            invocation.operation(),
            status,
            invocation
        ))
    }

    fn capture(&mut self, invocation: &Invocation) -> Result<String> {
        info!(command = %invocation, "running package manager");
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .output()
            .with_context(|| {
                format!(
                    "{} {} failed to start",
                    invocation.program,
                    invocation.operation()
                )
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} {} failed: status={} command='{}' stderr='{}'",
                invocation.program,
                invocation.operation(),
                output.status,
                invocation,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).with_context(|| {
            format!(
                "{} {} produced non-UTF-8 output",
                invocation.program,
                invocation.operation()
            )
        })
    }
}
