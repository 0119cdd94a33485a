//! Implementation of the `libforge build` command.

use anyhow::{Context, Result, bail};
use serde::Serialize;

use libforge_lib::ConfigOverrides;
use libforge_lib::plan::{FailurePolicy, PlanReport, RunOptions};
use libforge_lib::prefix_lock::{LockMode, PrefixLock};
use libforge_lib::process::{Invocation, ProcessRunner, RecordingRunner};

use super::{load_context, load_plan, runtime};
use crate::output::{
  OutputFormat, format_duration, print_command, print_error, print_info, print_json, print_stat, print_success,
  print_warning,
};

#[derive(Debug, Clone, Copy)]
pub struct BuildFlags {
  pub keep_going: bool,
  pub sync: bool,
  pub dry_run: bool,
}

#[derive(Serialize)]
struct DryRunOutput<'a> {
  report: &'a PlanReport,
  commands: &'a [Invocation],
}

/// Build the selected libraries (all of them by default) in plan order.
///
/// Exits with an error if any library failed or was skipped.
pub fn cmd_build(
  overrides: ConfigOverrides,
  libraries: &[String],
  flags: BuildFlags,
  output: OutputFormat,
) -> Result<()> {
  let ctx = load_context(overrides)?;
  let plan = load_plan(&ctx, libraries)?;
  let options = RunOptions {
    policy: if flags.keep_going {
      FailurePolicy::Continue
    } else {
      FailurePolicy::Halt
    },
    sync_submodules: flags.sync,
  };

  let rt = runtime()?;

  let report = if flags.dry_run {
    let runner = RecordingRunner::dry_run();
    let report = rt.block_on(plan.run(&ctx, &runner, &options)).context("Build failed")?;
    let commands = runner.invocations();

    if output.is_json() {
      print_json(&DryRunOutput {
        report: &report,
        commands: &commands,
      })?;
    } else {
      print_info("Dry run - no commands executed");
      for command in &commands {
        print_command(&command.to_string());
      }
    }
    report
  } else {
    let _lock =
      PrefixLock::acquire(&ctx.prefix(), LockMode::Exclusive, "build").context("Failed to acquire prefix lock")?;
    let report = rt
      .block_on(plan.run(&ctx, &ProcessRunner, &options))
      .context("Build failed")?;

    if output.is_json() {
      print_json(&report)?;
    }
    report
  };

  if !output.is_json() {
    print_summary(&report);
  }

  if !report.is_success() {
    bail!(
      "{} of {} libraries did not install",
      report.failed.len() + report.not_attempted.len(),
      plan.len()
    );
  }

  Ok(())
}

fn print_summary(report: &PlanReport) {
  println!();
  for built in &report.built {
    print_success(&format!(
      "{} ({}) in {}",
      built.library,
      built.configs.join(", "),
      format_duration(built.duration)
    ));
  }
  for failure in &report.failed {
    print_error(&failure.error.to_string());
  }
  if !report.not_attempted.is_empty() {
    print_warning(&format!("Not attempted: {}", report.not_attempted.join(", ")));
  }

  print_stat("Installed", &report.built.len().to_string());
  print_stat("Failed", &report.failed.len().to_string());
  print_stat("Duration", &format_duration(report.total_duration()));
}
