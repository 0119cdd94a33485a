use std::time::Duration;

use serde::{Serialize, Serializer};

use super::LibraryError;
use crate::pipeline::LibraryBuild;

#[derive(Debug, Serialize)]
pub struct LibraryFailure {
  pub library: String,
  #[serde(serialize_with = "display")]
  pub error: LibraryError,
}

fn display<S: Serializer>(error: &LibraryError, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.collect_str(error)
}

/// Outcome of running a plan.
#[derive(Debug, Default, Serialize)]
pub struct PlanReport {
  pub built: Vec<LibraryBuild>,
  pub failed: Vec<LibraryFailure>,
  /// Libraries skipped because an earlier failure halted the plan.
  pub not_attempted: Vec<String>,
}

impl PlanReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty() && self.not_attempted.is_empty()
  }

  pub fn built_names(&self) -> Vec<&str> {
    self.built.iter().map(|b| b.library.as_str()).collect()
  }

  pub fn failed_names(&self) -> Vec<&str> {
    self.failed.iter().map(|f| f.library.as_str()).collect()
  }

  pub fn total_duration(&self) -> Duration {
    self.built.iter().map(|b| b.duration).sum()
  }
}
