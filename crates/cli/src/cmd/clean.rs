//! Implementation of the `libforge clean` command.

use anyhow::{Context, Result};

use libforge_lib::ConfigOverrides;
use libforge_lib::pipeline::remove_build_tree;
use libforge_lib::prefix_lock::{LockMode, PrefixLock};

use super::{load_context, load_plan};
use crate::output::{print_info, print_success};

/// Delete build trees. The shared prefix is left alone.
pub fn cmd_clean(overrides: ConfigOverrides, libraries: &[String]) -> Result<()> {
  let ctx = load_context(overrides)?;
  let plan = load_plan(&ctx, libraries)?;

  let _lock =
    PrefixLock::acquire(&ctx.prefix(), LockMode::Exclusive, "clean").context("Failed to acquire prefix lock")?;

  let mut removed = 0;
  for entry in plan.entries() {
    let existed = remove_build_tree(ctx.config(), &entry.spec)
      .with_context(|| format!("Failed to remove build tree of {}", entry.spec.name))?;
    if existed {
      removed += 1;
    }
  }

  if removed == 0 {
    print_info("Nothing to clean");
  } else {
    print_success(&format!("Removed {} build tree(s)", removed));
  }
  Ok(())
}
