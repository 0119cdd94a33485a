//! Library descriptions handed to the build pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;

/// Configuration used for the release install of every library.
pub const RELEASE_CONFIG: &str = "RelWithDebInfo";

/// Configuration used for the extra install of C++ libraries.
pub const DEBUG_CONFIG: &str = "Debug";

pub const INSTALL_TARGET: &str = "install";

/// Language class of a library.
///
/// C++ libraries need matching Debug and release runtime artifacts side by
/// side in the prefix, so they get an extra Debug install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  C,
  Cxx,
}

impl Language {
  pub fn needs_debug_artifacts(self) -> bool {
    matches!(self, Language::Cxx)
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Language::C => write!(f, "c"),
      Language::Cxx => write!(f, "c++"),
    }
  }
}

/// Value of a single `-D<key>=<value>` override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum OptionValue {
  Str(String),
  /// Rendered as `ON` / `OFF`.
  Bool(bool),
  /// A path relative to the shared prefix that an earlier library installs.
  /// Rendered as an absolute path and required to exist before configure.
  Artifact(PathBuf),
}

impl OptionValue {
  pub fn render(&self, prefix: &Path) -> String {
    match self {
      OptionValue::Str(s) => s.clone(),
      OptionValue::Bool(true) => "ON".to_string(),
      OptionValue::Bool(false) => "OFF".to_string(),
      OptionValue::Artifact(rel) => prefix.join(rel).display().to_string(),
    }
  }
}

impl From<&str> for OptionValue {
  fn from(s: &str) -> Self {
    OptionValue::Str(s.to_string())
  }
}

impl From<String> for OptionValue {
  fn from(s: String) -> Self {
    OptionValue::Str(s)
  }
}

impl From<bool> for OptionValue {
  fn from(b: bool) -> Self {
    OptionValue::Bool(b)
  }
}

/// A submodule to sync before building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmoduleRef {
  /// Submodule path, relative to the working tree it belongs to.
  pub path: PathBuf,
  /// Root-relative working tree that owns the submodule. `None` is the
  /// top-level tree.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibrarySpec {
  pub name: String,
  /// Root-relative source directory. Defaults to `libraries/<name>`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source_dir: Option<PathBuf>,
  pub options: BTreeMap<String, OptionValue>,
  /// Extra C++ compiler flags, passed to configure through `CXXFLAGS`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cxxflags: Option<Vec<String>>,
  pub language: Language,
  pub release_config: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub submodules: Vec<SubmoduleRef>,
  /// Libraries whose installed artifacts this one consumes.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<String>,
}

impl LibrarySpec {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      source_dir: None,
      options: BTreeMap::new(),
      cxxflags: None,
      language: Language::C,
      release_config: RELEASE_CONFIG.to_string(),
      submodules: Vec::new(),
      depends_on: Vec::new(),
    }
  }

  pub fn cxx(mut self) -> Self {
    self.language = Language::Cxx;
    self
  }

  pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.source_dir = Some(dir.into());
    self
  }

  /// Set one option. A repeated key replaces the earlier value.
  pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
    self.options.insert(key.into(), value.into());
    self
  }

  /// Reference an artifact installed by an earlier library.
  pub fn artifact(mut self, key: impl Into<String>, prefix_relative: impl Into<PathBuf>) -> Self {
    self
      .options
      .insert(key.into(), OptionValue::Artifact(prefix_relative.into()));
    self
  }

  pub fn cxxflags<I, S>(mut self, flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.cxxflags = Some(flags.into_iter().map(Into::into).collect());
    self
  }

  pub fn release_config(mut self, config: impl Into<String>) -> Self {
    self.release_config = config.into();
    self
  }

  /// Sync a submodule of the top-level tree.
  pub fn submodule(mut self, path: impl Into<PathBuf>) -> Self {
    self.submodules.push(SubmoduleRef {
      path: path.into(),
      parent: None,
    });
    self
  }

  /// Sync a submodule vendored inside another working tree.
  pub fn nested_submodule(mut self, parent: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
    self.submodules.push(SubmoduleRef {
      path: path.into(),
      parent: Some(parent.into()),
    });
    self
  }

  pub fn depends_on(mut self, library: impl Into<String>) -> Self {
    self.depends_on.push(library.into());
    self
  }

  pub fn source_path(&self, config: &Config) -> PathBuf {
    match &self.source_dir {
      Some(dir) => config.root_path(dir),
      None => config.libraries_dir().join(&self.name),
    }
  }

  /// `<root>/build/<name>`; never shared between libraries.
  pub fn build_path(&self, config: &Config) -> PathBuf {
    config.build_root().join(&self.name)
  }

  /// Configurations installed, in install order.
  pub fn install_configs(&self) -> Vec<&str> {
    let mut configs = Vec::with_capacity(2);
    if self.language.needs_debug_artifacts() {
      configs.push(DEBUG_CONFIG);
    }
    configs.push(self.release_config.as_str());
    configs
  }

  /// Prefix-relative artifacts referenced by options, keyed by option name.
  pub fn artifacts(&self) -> impl Iterator<Item = (&str, &Path)> {
    self.options.iter().filter_map(|(key, value)| match value {
      OptionValue::Artifact(path) => Some((key.as_str(), path.as_path())),
      _ => None,
    })
  }
}
