//! Implementation of the `libforge sync` command.

use anyhow::{Context, Result};

use libforge_lib::ConfigOverrides;
use libforge_lib::prefix_lock::{LockMode, PrefixLock};
use libforge_lib::process::{ProcessRunner, RecordingRunner};

use super::{load_context, load_plan, runtime};
use crate::output::{print_command, print_info, print_success};

/// Initialize and update every submodule of the selected libraries.
pub fn cmd_sync(overrides: ConfigOverrides, libraries: &[String], dry_run: bool) -> Result<()> {
  let ctx = load_context(overrides)?;
  let plan = load_plan(&ctx, libraries)?;
  let rt = runtime()?;

  if dry_run {
    let runner = RecordingRunner::dry_run();
    rt.block_on(plan.sync(&ctx, &runner)).context("Submodule sync failed")?;

    print_info("Dry run - no commands executed");
    for command in runner.invocations() {
      print_command(&command.to_string());
    }
    return Ok(());
  }

  let _lock = PrefixLock::acquire(&ctx.prefix(), LockMode::Exclusive, "sync").context("Failed to acquire prefix lock")?;
  let synced = rt
    .block_on(plan.sync(&ctx, &ProcessRunner))
    .context("Submodule sync failed")?;

  print_success(&format!("Synced {} submodule(s) for {} libraries", synced, plan.len()));
  Ok(())
}
