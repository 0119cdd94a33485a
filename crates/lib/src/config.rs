//! Layout and tool configuration.
//!
//! Every setting resolves in the same order: explicit override (CLI flag),
//! then environment variable, then default.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{BUILD_DIR, ENV_CMAKE, ENV_GENERATOR, ENV_GIT, ENV_ROOT, GIT, LIBRARIES_DIR, PREFIX_DIR};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] std::io::Error),

  #[error("root directory does not exist: {0}")]
  RootNotFound(PathBuf),

  #[error("failed to resolve root directory '{path}': {source}")]
  Canonicalize {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("root directory is not valid UTF-8: {}", .0.display())]
  NonUtf8Root(PathBuf),
}

/// Values supplied on the command line. `None` falls through to the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  pub root: Option<PathBuf>,
  pub generator: Option<String>,
  pub cmake: Option<PathBuf>,
  pub git: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Repository root. Sources, build trees and the prefix all live under it.
  pub root: PathBuf,

  /// Generator override. `None` uses the platform default.
  pub generator: Option<String>,

  /// CMake program override (a name looked up on PATH, or a path).
  pub cmake: Option<PathBuf>,

  /// Git program used for submodule syncs.
  pub git: PathBuf,
}

impl Config {
  /// Config rooted at `root` with every tool at its default.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      generator: None,
      cmake: None,
      git: PathBuf::from(GIT),
    }
  }

  /// Resolve the configuration from overrides and the process environment.
  ///
  /// The root must exist and be valid UTF-8; it is canonicalized so every
  /// path handed to CMake and git is absolute. Every derived path is the root
  /// plus ASCII components, so arguments never need lossy conversion.
  pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
    let root = match overrides.root.or_else(|| env_path(ENV_ROOT)) {
      Some(root) => root,
      None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
    };

    if !root.exists() {
      return Err(ConfigError::RootNotFound(root));
    }
    let root = dunce::canonicalize(&root).map_err(|source| ConfigError::Canonicalize { path: root, source })?;
    if root.to_str().is_none() {
      return Err(ConfigError::NonUtf8Root(root));
    }

    let config = Self {
      root,
      generator: overrides.generator.or_else(|| env_string(ENV_GENERATOR)),
      cmake: overrides.cmake.or_else(|| env_path(ENV_CMAKE)),
      git: overrides.git.or_else(|| env_path(ENV_GIT)).unwrap_or_else(|| PathBuf::from(GIT)),
    };

    debug!(root = %config.root.display(), generator = ?config.generator, cmake = ?config.cmake, "resolved config");
    Ok(config)
  }

  pub fn libraries_dir(&self) -> PathBuf {
    self.root.join(LIBRARIES_DIR)
  }

  /// Parent of every per-library build tree.
  pub fn build_root(&self) -> PathBuf {
    self.root.join(BUILD_DIR)
  }

  /// The shared install prefix, also used as the CMake search prefix.
  pub fn prefix(&self) -> PathBuf {
    self.root.join(PREFIX_DIR)
  }

  /// Resolve a root-relative path. Absolute paths are returned unchanged.
  pub fn root_path(&self, path: &Path) -> PathBuf {
    self.root.join(path)
  }
}

fn env_string(var: &str) -> Option<String> {
  std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn env_path(var: &str) -> Option<PathBuf> {
  env_string(var).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  fn clear_env<F: FnOnce()>(f: F) {
    temp_env::with_vars(
      [
        (ENV_ROOT, None::<&str>),
        (ENV_GENERATOR, None::<&str>),
        (ENV_CMAKE, None::<&str>),
        (ENV_GIT, None::<&str>),
      ],
      f,
    );
  }

  #[test]
  fn layout_is_derived_from_root() {
    let config = Config::new("/work");
    assert_eq!(config.libraries_dir(), PathBuf::from("/work/libraries"));
    assert_eq!(config.build_root(), PathBuf::from("/work/build"));
    assert_eq!(config.prefix(), PathBuf::from("/work/local"));
  }

  #[test]
  #[serial]
  fn defaults_without_overrides() {
    let temp = TempDir::new().unwrap();
    clear_env(|| {
      let config = Config::resolve(ConfigOverrides {
        root: Some(temp.path().to_path_buf()),
        ..Default::default()
      })
      .unwrap();

      assert_eq!(config.root, dunce::canonicalize(temp.path()).unwrap());
      assert!(config.generator.is_none());
      assert!(config.cmake.is_none());
      assert_eq!(config.git, PathBuf::from("git"));
    });
  }

  #[test]
  #[serial]
  fn environment_fills_missing_overrides() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_str().unwrap();
    temp_env::with_vars(
      [
        (ENV_ROOT, Some(root)),
        (ENV_GENERATOR, Some("Ninja")),
        (ENV_CMAKE, Some("/opt/cmake/bin/cmake")),
        (ENV_GIT, None),
      ],
      || {
        let config = Config::resolve(ConfigOverrides::default()).unwrap();
        assert_eq!(config.root, dunce::canonicalize(temp.path()).unwrap());
        assert_eq!(config.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.cmake, Some(PathBuf::from("/opt/cmake/bin/cmake")));
      },
    );
  }

  #[test]
  #[serial]
  fn overrides_take_precedence_over_environment() {
    let env_root = TempDir::new().unwrap();
    let flag_root = TempDir::new().unwrap();
    temp_env::with_vars(
      [
        (ENV_ROOT, Some(env_root.path().to_str().unwrap())),
        (ENV_GENERATOR, Some("Ninja")),
      ],
      || {
        let config = Config::resolve(ConfigOverrides {
          root: Some(flag_root.path().to_path_buf()),
          generator: Some("Unix Makefiles".to_string()),
          ..Default::default()
        })
        .unwrap();
        assert_eq!(config.root, dunce::canonicalize(flag_root.path()).unwrap());
        assert_eq!(config.generator.as_deref(), Some("Unix Makefiles"));
      },
    );
  }

  #[test]
  #[serial]
  fn empty_environment_values_are_ignored() {
    let temp = TempDir::new().unwrap();
    temp_env::with_vars([(ENV_GENERATOR, Some("")), (ENV_ROOT, None)], || {
      let config = Config::resolve(ConfigOverrides {
        root: Some(temp.path().to_path_buf()),
        ..Default::default()
      })
      .unwrap();
      assert!(config.generator.is_none());
    });
  }

  #[test]
  #[serial]
  fn missing_root_is_an_error() {
    clear_env(|| {
      let result = Config::resolve(ConfigOverrides {
        root: Some(PathBuf::from("/nonexistent/libforge/root/12345")),
        ..Default::default()
      });
      assert!(matches!(result, Err(ConfigError::RootNotFound(_))));
    });
  }

  #[cfg(target_os = "linux")]
  #[test]
  #[serial]
  fn non_utf8_root_is_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join(OsStr::from_bytes(b"libs-\xff"));
    std::fs::create_dir(&root).unwrap();

    clear_env(|| {
      let result = Config::resolve(ConfigOverrides {
        root: Some(root.clone()),
        ..Default::default()
      });
      assert!(matches!(result, Err(ConfigError::NonUtf8Root(_))));
    });
  }
}
