use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::platform::Os;
use crate::toolchain::{BuildEnvironment, EnvironmentResolver, ToolError};

/// Everything a build needs that is fixed for the life of the process.
///
/// Constructed once at startup and passed by reference to the submodule
/// synchronizer, the pipeline and the plan.
#[derive(Debug)]
pub struct BuildContext {
  config: Config,
  os: Option<Os>,
  resolver: EnvironmentResolver,
}

impl BuildContext {
  /// Context for the current host, resolving tools from `config`.
  pub fn new(config: Config) -> Self {
    let os = Os::current();
    let resolver = EnvironmentResolver::from_config(&config, os);
    Self { config, os, resolver }
  }

  /// Context with an explicit OS and resolver.
  pub fn with_resolver(config: Config, os: Option<Os>, resolver: EnvironmentResolver) -> Self {
    Self { config, os, resolver }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn os(&self) -> Option<Os> {
    self.os
  }

  pub fn environment(&self) -> &BuildEnvironment {
    self.resolver.environment()
  }

  pub fn cmake(&self) -> Result<&Path, ToolError> {
    self.resolver.tool_location()
  }

  pub fn prefix(&self) -> PathBuf {
    self.config.prefix()
  }
}
