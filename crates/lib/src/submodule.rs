//! `git submodule` synchronization.
//!
//! A sync is two git calls, `submodule init <path>` then `submodule update
//! <path>`. Both are no-ops for a subtree that is already initialized and at
//! its pinned revision, so syncing is idempotent. The resulting working tree
//! is not inspected.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::process::{ExecError, Invocation, Runner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStep {
  Init,
  Update,
}

impl SyncStep {
  pub fn as_str(&self) -> &'static str {
    match self {
      SyncStep::Init => "init",
      SyncStep::Update => "update",
    }
  }
}

impl fmt::Display for SyncStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum SubmoduleError {
  #[error("git submodule {step} failed for '{path}' with exit code {code:?}")]
  SyncFailed {
    path: PathBuf,
    step: SyncStep,
    code: Option<i32>,
  },

  #[error("git submodule {step} could not run for '{path}': {source}")]
  Exec {
    path: PathBuf,
    step: SyncStep,
    #[source]
    source: ExecError,
  },
}

/// The git call for one sync step.
///
/// Without a parent the command runs at the root (the top-level tree).
/// With a parent it is scoped to that tree via `git -C <abs parent>`, and
/// `path` is relative to it.
pub fn sync_invocation(config: &Config, path: &Path, parent: Option<&Path>, step: SyncStep) -> Invocation {
  let mut inv = Invocation::new(&config.git).current_dir(&config.root);
  if let Some(parent) = parent {
    inv = inv.arg("-C").path_arg(&config.root_path(parent));
  }
  inv.args(["submodule", step.as_str()]).path_arg(path)
}

/// Initialize and update the submodule at `path`.
///
/// The update step is not attempted when init fails.
pub async fn sync_submodule<R: Runner>(
  config: &Config,
  runner: &R,
  path: &Path,
  parent: Option<&Path>,
) -> Result<(), SubmoduleError> {
  info!(path = %path.display(), parent = ?parent, "syncing submodule");

  for step in [SyncStep::Init, SyncStep::Update] {
    let inv = sync_invocation(config, path, parent, step);
    let exit = runner.run(&inv).await.map_err(|source| SubmoduleError::Exec {
      path: path.to_path_buf(),
      step,
      source,
    })?;

    if !exit.success {
      return Err(SubmoduleError::SyncFailed {
        path: path.to_path_buf(),
        step,
        code: exit.code,
      });
    }
  }

  Ok(())
}
