//! Build environment and tool resolution.
//!
//! Both facts are computed at most once per [`EnvironmentResolver`] and then
//! served from its cache for the rest of the process. A failed tool lookup
//! is cached as well; it is never retried.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::consts::CMAKE;
use crate::platform::Os;

/// Generator used when building with MSVC.
pub const VISUAL_STUDIO_GENERATOR: &str = "Visual Studio 17 2022";

/// Generator used everywhere else. It must be multi-config so that
/// `--config Debug` and `--config RelWithDebInfo` select real configurations.
pub const NINJA_MULTI_CONFIG_GENERATOR: &str = "Ninja Multi-Config";

/// Compiler quirks that change how some libraries are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileFlag {
  Msvc,
}

impl fmt::Display for CompileFlag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CompileFlag::Msvc => write!(f, "msvc"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildEnvironment {
  /// CMake generator name passed to `-G`.
  pub generator: String,
  pub flags: BTreeSet<CompileFlag>,
}

impl BuildEnvironment {
  /// Environment for an explicit generator. Visual Studio generators imply MSVC.
  pub fn for_generator(generator: impl Into<String>) -> Self {
    let generator = generator.into();
    let mut flags = BTreeSet::new();
    if generator.starts_with("Visual Studio") {
      flags.insert(CompileFlag::Msvc);
    }
    Self { generator, flags }
  }

  pub fn platform_default(os: Option<Os>) -> Self {
    match os {
      Some(Os::Windows) => Self::for_generator(VISUAL_STUDIO_GENERATOR),
      _ => Self::for_generator(NINJA_MULTI_CONFIG_GENERATOR),
    }
  }

  /// Whether the generator honors `cmake --build --config`.
  ///
  /// Single-config generators (Makefiles, plain Ninja) build whatever
  /// `CMAKE_BUILD_TYPE` was configured and ignore `--config`.
  pub fn is_multi_config(&self) -> bool {
    let generator = self.generator.as_str();
    generator.starts_with("Visual Studio") || generator == "Xcode" || generator == NINJA_MULTI_CONFIG_GENERATOR
  }

  pub fn has_flag(&self, flag: CompileFlag) -> bool {
    self.flags.contains(&flag)
  }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
  #[error("could not find {tool} installation (searched for '{program}')")]
  NotFound { tool: String, program: PathBuf },
}

type DetectFn = Box<dyn Fn() -> BuildEnvironment + Send + Sync>;
type LocateFn = Box<dyn Fn() -> Option<PathBuf> + Send + Sync>;

/// Memoizing resolver for the build environment and the CMake executable.
pub struct EnvironmentResolver {
  detect: DetectFn,
  locate: LocateFn,
  program: PathBuf,
  environment: OnceLock<BuildEnvironment>,
  tool: OnceLock<Option<PathBuf>>,
}

impl EnvironmentResolver {
  /// Build a resolver from explicit detection and lookup functions.
  ///
  /// `program` is only used to describe the tool in a `NotFound` error.
  pub fn new<D, L>(program: impl Into<PathBuf>, detect: D, locate: L) -> Self
  where
    D: Fn() -> BuildEnvironment + Send + Sync + 'static,
    L: Fn() -> Option<PathBuf> + Send + Sync + 'static,
  {
    Self {
      detect: Box::new(detect),
      locate: Box::new(locate),
      program: program.into(),
      environment: OnceLock::new(),
      tool: OnceLock::new(),
    }
  }

  /// Resolver driven by the configured generator and CMake overrides.
  ///
  /// Without a generator override the platform default applies. The CMake
  /// program is searched on PATH unless it is given as a path.
  pub fn from_config(config: &Config, os: Option<Os>) -> Self {
    let generator = config.generator.clone();
    let program = config.cmake.clone().unwrap_or_else(|| PathBuf::from(CMAKE));
    let search = program.clone();

    Self::new(
      program,
      move || match &generator {
        Some(generator) => BuildEnvironment::for_generator(generator.clone()),
        None => BuildEnvironment::platform_default(os),
      },
      move || which::which(&search).ok(),
    )
  }

  /// The process-wide build environment, detected on first access.
  pub fn environment(&self) -> &BuildEnvironment {
    self.environment.get_or_init(|| {
      let env = (self.detect)();
      debug!(generator = %env.generator, flags = ?env.flags, "resolved build environment");
      if !env.is_multi_config() {
        warn!(
          generator = %env.generator,
          "single-config generator ignores --config; Debug and RelWithDebInfo installs will be the same build"
        );
      }
      env
    })
  }

  /// Absolute path of the CMake executable, searched on first access.
  pub fn tool_location(&self) -> Result<&Path, ToolError> {
    let tool = self.tool.get_or_init(|| {
      let found = (self.locate)();
      match &found {
        Some(path) => info!(path = %path.display(), "found cmake"),
        None => debug!(program = %self.program.display(), "cmake not found"),
      }
      found
    });

    tool.as_deref().ok_or_else(|| ToolError::NotFound {
      tool: CMAKE.to_string(),
      program: self.program.clone(),
    })
  }
}

impl fmt::Debug for EnvironmentResolver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EnvironmentResolver")
      .field("program", &self.program)
      .field("environment", &self.environment.get())
      .field("tool", &self.tool.get())
      .finish_non_exhaustive()
  }
}
