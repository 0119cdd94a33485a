//! The build plan: a hand-ordered list of libraries.
//!
//! Order is the only thing that drives execution. A library must come after
//! every library whose installed artifacts it consumes; `depends_on` exists so
//! [`BuildPlan::validate`] can check that the hand-written order honors it.

mod graph;
mod report;
pub mod standard;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::context::BuildContext;
use crate::library::LibrarySpec;
use crate::pipeline::{self, PipelineError};
use crate::process::Runner;
use crate::submodule::{SubmoduleError, sync_submodule};
use crate::toolchain::ToolError;

pub use report::{LibraryFailure, PlanReport};
pub use standard::standard;

/// What to do with the rest of the plan after a library fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
  /// Stop; later libraries are reported as not attempted.
  #[default]
  Halt,
  /// Record the failure and keep building.
  Continue,
}

#[derive(Debug, Error)]
pub enum PlanError {
  #[error("{library} depends on unknown library '{dependency}'")]
  UnknownDependency { library: String, dependency: String },

  #[error("{library} is listed before its dependency '{dependency}'")]
  OutOfOrder { library: String, dependency: String },

  #[error("dependency cycle detected involving '{0}'")]
  CycleDetected(String),

  #[error("library '{0}' appears more than once in the plan")]
  DuplicateLibrary(String),

  #[error("unknown library '{0}'")]
  UnknownLibrary(String),

  #[error(transparent)]
  Tool(#[from] ToolError),
}

/// Why a single library did not install.
#[derive(Debug, Error)]
pub enum LibraryError {
  #[error(transparent)]
  Sync(#[from] SubmoduleError),

  #[error(transparent)]
  Build(#[from] PipelineError),
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
  pub spec: LibrarySpec,
  /// Overrides the run-wide policy for this library.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub on_failure: Option<FailurePolicy>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
  pub policy: FailurePolicy,
  /// Sync each library's submodules before building it.
  pub sync_submodules: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildPlan {
  entries: Vec<PlanEntry>,
}

impl BuildPlan {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a library using the run-wide failure policy.
  pub fn then(mut self, spec: LibrarySpec) -> Self {
    self.entries.push(PlanEntry { spec, on_failure: None });
    self
  }

  /// Append a library with its own failure policy.
  pub fn then_with(mut self, spec: LibrarySpec, on_failure: FailurePolicy) -> Self {
    self.entries.push(PlanEntry {
      spec,
      on_failure: Some(on_failure),
    });
    self
  }

  pub fn entries(&self) -> &[PlanEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|e| e.spec.name.as_str())
  }

  pub fn get(&self, name: &str) -> Option<&PlanEntry> {
    self.entries.iter().find(|e| e.spec.name == name)
  }

  /// Check that names are unique and that the order satisfies `depends_on`.
  pub fn validate(&self) -> Result<(), PlanError> {
    graph::validate(&self.entries)
  }

  /// The sub-plan containing only `names`, in plan order.
  ///
  /// An empty selection keeps the whole plan.
  pub fn select(&self, names: &[String]) -> Result<BuildPlan, PlanError> {
    if names.is_empty() {
      return Ok(self.clone());
    }

    for name in names {
      if self.get(name).is_none() {
        return Err(PlanError::UnknownLibrary(name.clone()));
      }
    }

    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    Ok(BuildPlan {
      entries: self
        .entries
        .iter()
        .filter(|e| wanted.contains(e.spec.name.as_str()))
        .cloned()
        .collect(),
    })
  }

  /// Sync the submodules of every library, in plan order. Stops at the first failure.
  pub async fn sync<R: Runner>(&self, ctx: &BuildContext, runner: &R) -> Result<usize, SubmoduleError> {
    let mut synced = 0;
    for entry in &self.entries {
      synced += sync_library(ctx, runner, &entry.spec).await?;
    }
    Ok(synced)
  }

  /// Sync and build every library, one at a time, in plan order.
  ///
  /// A missing CMake aborts before anything runs. Otherwise each failure is
  /// recorded in the report and the entry's policy (or `options.policy`)
  /// decides whether the remaining libraries are attempted.
  pub async fn run<R: Runner>(
    &self,
    ctx: &BuildContext,
    runner: &R,
    options: &RunOptions,
  ) -> Result<PlanReport, PlanError> {
    ctx.cmake()?;

    let mut report = PlanReport::default();

    for (index, entry) in self.entries.iter().enumerate() {
      let spec = &entry.spec;
      info!(library = %spec.name, position = index + 1, total = self.entries.len(), "starting library");

      let result = async {
        if options.sync_submodules {
          sync_library(ctx, runner, spec).await?;
        }
        pipeline::build(ctx, runner, spec).await.map_err(LibraryError::from)
      }
      .await;

      match result {
        Ok(built) => report.built.push(built),
        Err(LibraryError::Build(PipelineError::Tool(err))) => return Err(PlanError::Tool(err)),
        Err(error) => {
          let policy = entry.on_failure.unwrap_or(options.policy);
          warn!(library = %spec.name, error = %error, policy = ?policy, "library failed");
          report.failed.push(LibraryFailure {
            library: spec.name.clone(),
            error,
          });

          if policy == FailurePolicy::Halt {
            report.not_attempted = self.entries[index + 1..]
              .iter()
              .map(|e| e.spec.name.clone())
              .collect();
            break;
          }
        }
      }
    }

    Ok(report)
  }
}

async fn sync_library<R: Runner>(ctx: &BuildContext, runner: &R, spec: &LibrarySpec) -> Result<usize, SubmoduleError> {
  for submodule in &spec.submodules {
    sync_submodule(ctx.config(), runner, &submodule.path, submodule.parent.as_deref()).await?;
  }
  Ok(spec.submodules.len())
}
