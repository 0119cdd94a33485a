use std::path::Path;

use libforge_lib::pipeline::PipelineError;
use libforge_lib::plan::{BuildPlan, FailurePolicy, LibraryError, PlanError, RunOptions};
use libforge_lib::process::RecordingRunner;
use libforge_lib::toolchain::ToolError;
use libforge_lib::LibrarySpec;

use super::common::{Workspace, built_library, configured_library};

const ARTIFACT: &str = "lib/liba.a";

fn producer() -> LibrarySpec {
  LibrarySpec::new("a")
}

fn consumer() -> LibrarySpec {
  LibrarySpec::new("b").artifact("A_LIBRARY", ARTIFACT)
}

/// A runner whose install of `a` drops its library into the prefix.
fn installing_runner(prefix: &Path) -> RecordingRunner {
  let artifact = prefix.join(ARTIFACT);
  RecordingRunner::new().with_hook(move |inv| {
    if inv.flag_value("--target") == Some("install") && built_library(inv).as_deref() == Some("a") {
      std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
      std::fs::write(&artifact, b"archive").unwrap();
    }
    None
  })
}

#[tokio::test]
async fn producer_first_satisfies_consumer() {
  let ws = Workspace::new();
  let runner = installing_runner(&ws.prefix());
  let plan = BuildPlan::new().then(producer()).then(consumer());

  let report = plan.run(&ws.ctx, &runner, &RunOptions::default()).await.unwrap();

  assert!(report.is_success());
  assert_eq!(report.built_names(), vec!["a", "b"]);

  let configure_b = runner
    .invocations()
    .into_iter()
    .find(|i| configured_library(i).as_deref() == Some("b"))
    .unwrap();
  let expected = format!("-DA_LIBRARY={}", ws.prefix().join(ARTIFACT).display());
  assert!(configure_b.args.contains(&expected));
}

#[tokio::test]
async fn consumer_first_fails_its_artifact_check() {
  let ws = Workspace::new();
  let runner = installing_runner(&ws.prefix());
  let plan = BuildPlan::new().then(consumer()).then(producer());

  let report = plan.run(&ws.ctx, &runner, &RunOptions::default()).await.unwrap();

  assert_eq!(report.failed_names(), vec!["b"]);
  assert!(matches!(
    report.failed[0].error,
    LibraryError::Build(PipelineError::MissingArtifact { .. })
  ));
  assert_eq!(report.not_attempted, vec!["a"]);
  assert!(runner.invocations().is_empty());
}

#[tokio::test]
async fn consumer_first_with_continue_still_builds_producer() {
  let ws = Workspace::new();
  let runner = installing_runner(&ws.prefix());
  let plan = BuildPlan::new().then(consumer()).then(producer());
  let options = RunOptions {
    policy: FailurePolicy::Continue,
    ..Default::default()
  };

  let report = plan.run(&ws.ctx, &runner, &options).await.unwrap();

  assert_eq!(report.failed_names(), vec!["b"]);
  assert_eq!(report.built_names(), vec!["a"]);
  assert!(ws.prefix().join(ARTIFACT).exists());
}

#[test]
fn declared_dependencies_catch_the_wrong_order() {
  let plan = BuildPlan::new()
    .then(consumer().depends_on("a"))
    .then(producer());
  assert!(matches!(plan.validate(), Err(PlanError::OutOfOrder { .. })));
}

#[tokio::test]
async fn missing_cmake_stops_everything() {
  let ws = Workspace::without_cmake();
  let runner = RecordingRunner::new();
  let plan = BuildPlan::new().then(producer()).then(consumer());
  let options = RunOptions {
    policy: FailurePolicy::Continue,
    sync_submodules: true,
  };

  let err = plan.run(&ws.ctx, &runner, &options).await.unwrap_err();

  assert!(matches!(err, PlanError::Tool(ToolError::NotFound { .. })));
  assert!(err.to_string().contains("cmake"));
  assert!(runner.invocations().is_empty());
}

#[tokio::test]
async fn standard_plan_dry_run_touches_nothing() {
  let ws = Workspace::new();
  let runner = RecordingRunner::dry_run();
  let plan = libforge_lib::plan::standard(ws.ctx.environment(), ws.ctx.os());
  let options = RunOptions {
    sync_submodules: true,
    ..Default::default()
  };

  let report = plan.run(&ws.ctx, &runner, &options).await.unwrap();

  assert!(report.is_success());
  assert_eq!(report.built.len(), plan.len());
  assert!(!ws.root().join("build").exists());
  assert!(!ws.prefix().exists());

  let installs = runner
    .invocations()
    .iter()
    .filter(|i| i.flag_value("--target") == Some("install"))
    .count();
  // One release install each, plus Debug for the three C++ libraries.
  assert_eq!(installs, plan.len() + 3);
}
