//! Shared helpers for the build scenarios.

use std::path::{Path, PathBuf};

use libforge_lib::process::Invocation;
use libforge_lib::toolchain::{BuildEnvironment, EnvironmentResolver, NINJA_MULTI_CONFIG_GENERATOR};
use libforge_lib::{BuildContext, Config, platform::Os};
use tempfile::TempDir;

pub const CMAKE: &str = "/opt/cmake/bin/cmake";

/// A throwaway checkout with a resolver that never touches the host.
pub struct Workspace {
  pub temp: TempDir,
  pub ctx: BuildContext,
}

impl Workspace {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let resolver = EnvironmentResolver::new(
      "cmake",
      || BuildEnvironment::for_generator(NINJA_MULTI_CONFIG_GENERATOR),
      || Some(PathBuf::from(CMAKE)),
    );
    let ctx = BuildContext::with_resolver(Config::new(temp.path()), Some(Os::Linux), resolver);
    Self { temp, ctx }
  }

  /// Same as `new`, but CMake cannot be found.
  pub fn without_cmake() -> Self {
    let temp = TempDir::new().unwrap();
    let resolver = EnvironmentResolver::new("cmake", || BuildEnvironment::for_generator(NINJA_MULTI_CONFIG_GENERATOR), || None);
    let ctx = BuildContext::with_resolver(Config::new(temp.path()), Some(Os::Linux), resolver);
    Self { temp, ctx }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn prefix(&self) -> PathBuf {
    self.ctx.prefix()
  }
}

/// Build directory name of a `cmake --build` invocation.
pub fn built_library(inv: &Invocation) -> Option<String> {
  let dir = inv.flag_value("--build")?;
  Path::new(dir).file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Source directory name of a configure invocation.
pub fn configured_library(inv: &Invocation) -> Option<String> {
  let dir = inv.flag_value("-S")?;
  Path::new(dir).file_name().map(|n| n.to_string_lossy().into_owned())
}

/// `-D` tokens of a configure invocation.
pub fn defines(inv: &Invocation) -> Vec<String> {
  inv.args.iter().filter(|a| a.starts_with("-D")).cloned().collect()
}
