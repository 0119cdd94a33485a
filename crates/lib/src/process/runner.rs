use tokio::process::Command;
use tracing::{debug, info};

use super::{ExecError, Exit, Invocation, Runner};

/// Runs invocations as real child processes.
///
/// The child inherits the orchestrator's stdio and environment, plus the
/// invocation's overrides. Each call waits for the child to exit; there is
/// no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> Result<Exit, ExecError> {
    info!(cmd = %invocation, "running");

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args).envs(&invocation.env);
    if let Some(cwd) = &invocation.cwd {
      command.current_dir(cwd);
    }

    let status = command.status().await.map_err(|source| ExecError::Spawn {
      program: invocation.program.clone(),
      source,
    })?;

    debug!(program = %invocation.program.display(), status = %status, "process exited");

    Ok(Exit {
      success: status.success(),
      code: status.code(),
    })
  }
}
