//! Implementation of the `libforge status` command.
//!
//! Reads each library's install marker; nothing is built or synced.

use anyhow::{Context, Result};
use serde::Serialize;

use libforge_lib::ConfigOverrides;
use libforge_lib::pipeline::marker::read_marker;
use libforge_lib::prefix_lock::{LockMode, PrefixLock};

use super::{load_context, load_plan};
use crate::output::{OutputFormat, format_age, format_unix_time, print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct LibraryStatus {
  library: String,
  installed: bool,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  configs: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  installed_at: Option<String>,
  #[serde(skip)]
  installed_at_unix: Option<u64>,
}

pub fn cmd_status(overrides: ConfigOverrides, output: OutputFormat) -> Result<()> {
  let ctx = load_context(overrides)?;
  let plan = load_plan(&ctx, &[])?;
  let prefix = ctx.prefix();

  // A missing prefix means nothing is installed; don't create it just to lock it.
  let _lock = if prefix.exists() {
    Some(PrefixLock::acquire(&prefix, LockMode::Shared, "status").context("Failed to acquire prefix lock")?)
  } else {
    None
  };

  let mut statuses = Vec::with_capacity(plan.len());
  for entry in plan.entries() {
    let build_dir = entry.spec.build_path(ctx.config());
    let marker = read_marker(&build_dir)
      .with_context(|| format!("Failed to read install marker in {}", build_dir.display()))?;
    statuses.push(LibraryStatus {
      library: entry.spec.name.clone(),
      installed: marker.is_some(),
      configs: marker.as_ref().map(|m| m.configs.clone()).unwrap_or_default(),
      installed_at: marker.as_ref().map(|m| format_unix_time(m.installed_at_unix)),
      installed_at_unix: marker.as_ref().map(|m| m.installed_at_unix),
    });
  }

  if output.is_json() {
    return print_json(&statuses);
  }

  print_stat("Prefix", &prefix.display().to_string());
  println!();
  for status in &statuses {
    match status.installed_at_unix {
      Some(at) => print_success(&format!(
        "{} ({}) installed {}",
        status.library,
        status.configs.join(", "),
        format_age(at)
      )),
      None => print_info(&format!("{} not installed", status.library)),
    }
  }

  let installed = statuses.iter().filter(|s| s.installed).count();
  println!();
  print_stat("Installed", &format!("{}/{}", installed, statuses.len()));
  Ok(())
}
