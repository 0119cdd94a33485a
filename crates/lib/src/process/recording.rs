use std::sync::Mutex;

use tracing::info;

use super::{ExecError, Exit, Invocation, Runner};

type Hook = Box<dyn Fn(&Invocation) -> Option<i32> + Send + Sync>;

/// Records invocations instead of running them.
///
/// Every invocation exits successfully unless a hook returns an exit code
/// for it. Hooks may also simulate side effects, such as creating the files
/// an install step would produce.
#[derive(Default)]
pub struct RecordingRunner {
  invocations: Mutex<Vec<Invocation>>,
  hooks: Vec<Hook>,
  dry_run: bool,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// A recorder that reports itself as a dry run, so disk checks are skipped.
  pub fn dry_run() -> Self {
    Self {
      dry_run: true,
      ..Self::default()
    }
  }

  /// Add a hook. The first hook returning `Some(code)` decides the exit code.
  pub fn with_hook<F>(mut self, hook: F) -> Self
  where
    F: Fn(&Invocation) -> Option<i32> + Send + Sync + 'static,
  {
    self.hooks.push(Box::new(hook));
    self
  }

  /// Everything recorded so far, in execution order.
  pub fn invocations(&self) -> Vec<Invocation> {
    self.lock().clone()
  }

  /// Drain the recorded invocations.
  pub fn take(&self) -> Vec<Invocation> {
    std::mem::take(&mut *self.lock())
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Invocation>> {
    self.invocations.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl Runner for RecordingRunner {
  async fn run(&self, invocation: &Invocation) -> Result<Exit, ExecError> {
    if self.dry_run {
      info!(cmd = %invocation, "dry run");
    }
    self.lock().push(invocation.clone());

    let code = self.hooks.iter().find_map(|hook| hook(invocation));
    Ok(code.map(Exit::with_code).unwrap_or_else(Exit::ok))
  }

  fn is_dry_run(&self) -> bool {
    self.dry_run
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn records_in_order() {
    let runner = RecordingRunner::new();
    runner.run(&Invocation::new("a")).await.unwrap();
    runner.run(&Invocation::new("b")).await.unwrap();

    let programs: Vec<_> = runner.invocations().into_iter().map(|i| i.program).collect();
    assert_eq!(programs, vec![std::path::PathBuf::from("a"), std::path::PathBuf::from("b")]);
  }

  #[tokio::test]
  async fn hook_overrides_exit_code() {
    let runner = RecordingRunner::new().with_hook(|inv| (inv.program.as_os_str() == "bad").then_some(2));

    assert!(runner.run(&Invocation::new("good")).await.unwrap().success);
    let exit = runner.run(&Invocation::new("bad")).await.unwrap();
    assert_eq!(exit.code, Some(2));
  }

  #[tokio::test]
  async fn take_drains() {
    let runner = RecordingRunner::dry_run();
    assert!(runner.is_dry_run());
    runner.run(&Invocation::new("a")).await.unwrap();
    assert_eq!(runner.take().len(), 1);
    assert!(runner.invocations().is_empty());
  }
}
