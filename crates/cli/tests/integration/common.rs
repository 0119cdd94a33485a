//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated checkout with a stand-in `cmake`.
///
/// The stub logs its arguments to `cmake.log` and exits with the given code,
/// so builds run end to end without a real toolchain.
pub struct TestEnv {
  pub temp: TempDir,
  cmake: PathBuf,
}

impl TestEnv {
  pub fn with_cmake_exit(code: i32) -> Self {
    let temp = TempDir::new().unwrap();
    let cmake = temp.path().join("bin").join("cmake");
    let log = temp.path().join("cmake.log");
    write_script(
      &cmake,
      &format!("#!/bin/sh\necho \"$@\" >> '{}'\nexit {}\n", log.display(), code),
    );
    Self { temp, cmake }
  }

  pub fn new() -> Self {
    Self::with_cmake_exit(0)
  }

  /// Checkout root, canonicalized the way the CLI resolves it.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn build_dir(&self, library: &str) -> PathBuf {
    self.root().join("build").join(library)
  }

  /// Lines the stub has logged so far.
  pub fn cmake_calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.temp.path().join("cmake.log"))
      .map(|s| s.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  /// A `libforge` command pointed at this checkout and stub.
  pub fn libforge(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("libforge");
    cmd.arg("--root").arg(self.temp.path());
    cmd.arg("--cmake").arg(&self.cmake);
    cmd.env_remove("LIBFORGE_ROOT");
    cmd.env_remove("LIBFORGE_CMAKE");
    cmd.env_remove("LIBFORGE_GENERATOR");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

fn write_script(path: &Path, content: &str) {
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }
}
