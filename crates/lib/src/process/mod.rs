//! External process invocation.
//!
//! Every CMake and git call goes through a [`Runner`]. [`ProcessRunner`]
//! starts real child processes; [`RecordingRunner`] only records what would
//! have run, for dry runs and tests.

mod recording;
mod runner;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use recording::RecordingRunner;
pub use runner::ProcessRunner;

#[derive(Debug, Error)]
pub enum ExecError {
  /// The process could not be started at all.
  #[error("failed to spawn '{program}': {source}")]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A single external command.
///
/// `env` holds overrides layered over the inherited environment of this one
/// child; the orchestrator's own environment is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cwd: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  /// Paths under a resolved root are UTF-8, since `Config::resolve` rejects
  /// any other root, so this conversion is exact.
  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.display().to_string())
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Position of the first argument equal to `arg`.
  pub fn position(&self, arg: &str) -> Option<usize> {
    self.args.iter().position(|a| a == arg)
  }

  /// Value following the first occurrence of `flag`, e.g. `--config Debug`.
  pub fn flag_value(&self, flag: &str) -> Option<&str> {
    self.position(flag).and_then(|i| self.args.get(i + 1)).map(String::as_str)
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, quote(value))?;
    }
    write!(f, "{}", quote(&self.program.display().to_string()))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(s: &str) -> String {
  if s.is_empty() || s.contains(char::is_whitespace) {
    format!("\"{}\"", s)
  } else {
    s.to_string()
  }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exit {
  pub success: bool,
  /// `None` when the process was terminated by a signal.
  pub code: Option<i32>,
}

impl Exit {
  pub fn ok() -> Self {
    Self {
      success: true,
      code: Some(0),
    }
  }

  pub fn with_code(code: i32) -> Self {
    Self {
      success: code == 0,
      code: Some(code),
    }
  }
}

/// Runs invocations to completion, one at a time.
pub trait Runner {
  /// Run `invocation` and wait for it to exit.
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<Exit, ExecError>>;

  /// Whether this runner only records invocations without touching the disk.
  ///
  /// Checks that depend on earlier steps having really run (prefix artifacts,
  /// install markers) are skipped for dry runs.
  fn is_dry_run(&self) -> bool {
    false
  }
}
