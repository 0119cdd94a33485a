//! Configure/build/install pipeline for a single library.
//!
//! A build runs, in order:
//! 1. configure: `cmake -G <generator> -S <src> -B <build>` with the shared
//!    prefix as both `CMAKE_PREFIX_PATH` and `CMAKE_INSTALL_PREFIX`, then one
//!    `-D<key>=<value>` token per option
//! 2. `cmake --build <build> --config Debug --target install` (C++ only)
//! 3. `cmake --build <build> --config <release> --target install`
//!
//! The first non-zero exit ends the pipeline. The install marker of an earlier
//! run is cleared before configuring, so only a complete install leaves one.

pub mod marker;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::context::BuildContext;
use crate::library::{INSTALL_TARGET, LibrarySpec};
use crate::process::{ExecError, Invocation, Runner};
use crate::toolchain::ToolError;

use marker::{InstallMarker, clear_marker, write_marker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum Step {
  Configure,
  Install { config: String },
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::Configure => write!(f, "configure"),
      Step::Install { config } => write!(f, "install ({})", config),
    }
  }
}

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error("{library}: {key} refers to {path}, which is not installed yet")]
  MissingArtifact {
    library: String,
    key: String,
    path: PathBuf,
  },

  #[error("{library}: {step} failed with exit code {code:?}")]
  StepFailed {
    library: String,
    step: Step,
    code: Option<i32>,
  },

  #[error("{library}: {step} could not run: {source}")]
  Exec {
    library: String,
    step: Step,
    #[source]
    source: ExecError,
  },

  #[error("{library}: failed to write install marker: {source}")]
  WriteMarker {
    library: String,
    #[source]
    source: std::io::Error,
  },

  #[error("{library}: failed to clear previous install marker: {source}")]
  ClearMarker {
    library: String,
    #[source]
    source: std::io::Error,
  },
}

impl PipelineError {
  /// Errors that no other library could avoid either.
  pub fn is_fatal(&self) -> bool {
    matches!(self, PipelineError::Tool(_))
  }
}

/// A successfully installed library.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryBuild {
  pub library: String,
  pub configs: Vec<String>,
  pub duration: Duration,
}

/// The configure invocation for `spec`.
///
/// `CXXFLAGS` is set on this child only, and only when the library has flags.
pub fn configure_invocation(ctx: &BuildContext, spec: &LibrarySpec) -> Result<Invocation, ToolError> {
  let cmake = ctx.cmake()?;
  let config = ctx.config();
  let prefix = config.prefix();

  let mut inv = Invocation::new(cmake)
    .args(["-G", ctx.environment().generator.as_str()])
    .arg("-S")
    .path_arg(&spec.source_path(config))
    .arg("-B")
    .path_arg(&spec.build_path(config))
    .arg(format!("-DCMAKE_PREFIX_PATH={}", prefix.display()))
    .arg(format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()));

  for (key, value) in &spec.options {
    inv = inv.arg(format!("-D{}={}", key, value.render(&prefix)));
  }

  if let Some(flags) = &spec.cxxflags {
    inv = inv.env("CXXFLAGS", flags.join(" "));
  }

  Ok(inv)
}

/// `cmake --build <dir>` with an optional configuration and target.
pub fn build_invocation(cmake: &Path, build_dir: &Path, config: Option<&str>, target: Option<&str>) -> Invocation {
  let mut inv = Invocation::new(cmake).arg("--build").path_arg(build_dir);
  if let Some(config) = config {
    inv = inv.args(["--config", config]);
  }
  if let Some(target) = target {
    inv = inv.args(["--target", target]);
  }
  inv
}

/// Build and install `spec` into the shared prefix.
pub async fn build<R: Runner>(ctx: &BuildContext, runner: &R, spec: &LibrarySpec) -> Result<LibraryBuild, PipelineError> {
  let start = Instant::now();
  let cmake = ctx.cmake()?;
  let build_dir = spec.build_path(ctx.config());

  if !runner.is_dry_run() {
    check_artifacts(ctx.config(), spec)?;
    let cleared = clear_marker(&build_dir)
      .await
      .map_err(|source| PipelineError::ClearMarker {
        library: spec.name.clone(),
        source,
      })?;
    if cleared {
      debug!(library = %spec.name, "cleared previous install marker");
    }
  }

  info!(library = %spec.name, language = %spec.language, "configuring");
  let configure = configure_invocation(ctx, spec)?;
  run_step(runner, spec, Step::Configure, &configure).await?;

  let configs = spec.install_configs();
  for config in configs.iter().copied() {
    info!(library = %spec.name, config = %config, "building and installing");
    let inv = build_invocation(cmake, &build_dir, Some(config), Some(INSTALL_TARGET));
    let step = Step::Install {
      config: config.to_string(),
    };
    run_step(runner, spec, step, &inv).await?;
  }

  if !runner.is_dry_run() {
    let marker = InstallMarker::new(&spec.name, &configs);
    write_marker(&build_dir, &marker)
      .await
      .map_err(|source| PipelineError::WriteMarker {
        library: spec.name.clone(),
        source,
      })?;
  }

  let duration = start.elapsed();
  info!(library = %spec.name, elapsed = ?duration, "installed");

  Ok(LibraryBuild {
    library: spec.name.clone(),
    configs: configs.iter().map(|c| c.to_string()).collect(),
    duration,
  })
}

/// Every artifact option must already exist under the prefix.
fn check_artifacts(config: &Config, spec: &LibrarySpec) -> Result<(), PipelineError> {
  let prefix = config.prefix();
  for (key, rel) in spec.artifacts() {
    let path = prefix.join(rel);
    if !path.exists() {
      return Err(PipelineError::MissingArtifact {
        library: spec.name.clone(),
        key: key.to_string(),
        path,
      });
    }
    debug!(library = %spec.name, key, path = %path.display(), "artifact present");
  }
  Ok(())
}

async fn run_step<R: Runner>(runner: &R, spec: &LibrarySpec, step: Step, inv: &Invocation) -> Result<(), PipelineError> {
  let exit = match runner.run(inv).await {
    Ok(exit) => exit,
    Err(source) => {
      return Err(PipelineError::Exec {
        library: spec.name.clone(),
        step,
        source,
      });
    }
  };

  if !exit.success {
    warn!(library = %spec.name, step = %step, code = ?exit.code, "step failed");
    return Err(PipelineError::StepFailed {
      library: spec.name.clone(),
      step,
      code: exit.code,
    });
  }

  Ok(())
}

/// Delete the generated build tree of `spec`. Returns whether it existed.
pub fn remove_build_tree(config: &Config, spec: &LibrarySpec) -> std::io::Result<bool> {
  let dir = spec.build_path(config);
  if !dir.exists() {
    return Ok(false);
  }
  std::fs::remove_dir_all(&dir)?;
  info!(library = %spec.name, path = %dir.display(), "removed build tree");
  Ok(true)
}
