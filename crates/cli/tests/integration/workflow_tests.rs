//! End-to-end runs against a stub cmake.
#![cfg(unix)]

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_installs_and_status_reports_it() {
  let env = TestEnv::new();

  env
    .libforge()
    .args(["build", "--no-sync", "zlib"])
    .assert()
    .success()
    .stdout(predicate::str::contains("zlib (RelWithDebInfo)"));

  let calls = env.cmake_calls();
  assert_eq!(calls.len(), 2);
  assert!(calls[0].contains("-G Ninja Multi-Config"));
  assert!(calls[1].ends_with("--config RelWithDebInfo --target install"));
  assert!(env.build_dir("zlib").join(".libforge-complete").exists());

  let output = env.libforge().args(["status", "-o", "json"]).output().unwrap();
  assert!(output.status.success());
  let statuses: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let zlib = statuses
    .as_array()
    .unwrap()
    .iter()
    .find(|s| s["library"] == "zlib")
    .unwrap();
  assert_eq!(zlib["installed"], true);
  assert_eq!(zlib["configs"][0], "RelWithDebInfo");
}

#[test]
fn cxx_library_installs_debug_then_release() {
  let env = TestEnv::new();

  env.libforge().args(["build", "--no-sync", "jsoncpp"]).assert().success();

  let configs: Vec<_> = env
    .cmake_calls()
    .into_iter()
    .filter(|c| c.contains("--config"))
    .collect();
  assert_eq!(configs.len(), 2);
  assert!(configs[0].contains("--config Debug"));
  assert!(configs[1].contains("--config RelWithDebInfo"));
}

#[test]
fn failing_cmake_fails_the_build() {
  let env = TestEnv::with_cmake_exit(3);

  env
    .libforge()
    .args(["build", "--no-sync", "zlib", "libpng"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("configure failed with exit code Some(3)"))
    .stderr(predicate::str::contains("Not attempted: libpng"));

  assert_eq!(env.cmake_calls().len(), 1);
  assert!(!env.build_dir("zlib").join(".libforge-complete").exists());
}

#[test]
fn keep_going_attempts_every_library() {
  let env = TestEnv::with_cmake_exit(1);

  env
    .libforge()
    .args(["build", "--no-sync", "--keep-going", "zlib", "curl"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("2 of 2 libraries did not install"));

  assert_eq!(env.cmake_calls().len(), 2);
}

#[test]
fn missing_artifact_is_reported() {
  let env = TestEnv::new();

  env
    .libforge()
    .args(["build", "--no-sync", "fltk"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("which is not installed yet"));

  assert!(env.cmake_calls().is_empty());
}

#[test]
fn clean_removes_only_selected_build_trees() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.build_dir("zlib")).unwrap();
  std::fs::create_dir_all(env.build_dir("curl")).unwrap();

  env
    .libforge()
    .args(["clean", "zlib"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 1 build tree(s)"));

  assert!(!env.build_dir("zlib").exists());
  assert!(env.build_dir("curl").exists());
}
