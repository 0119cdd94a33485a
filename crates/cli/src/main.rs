mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use libforge_lib::ConfigOverrides;

use crate::output::OutputFormat;

/// libforge - build vendored native libraries into a shared prefix
#[derive(Parser)]
#[command(name = "libforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (RUST_LOG takes precedence)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args, Clone)]
struct GlobalArgs {
  /// Repository root [env: LIBFORGE_ROOT] (default: current directory)
  #[arg(long, global = true)]
  root: Option<PathBuf>,

  /// CMake generator [env: LIBFORGE_GENERATOR]
  #[arg(short = 'G', long, global = true)]
  generator: Option<String>,

  /// CMake executable [env: LIBFORGE_CMAKE]
  #[arg(long, global = true)]
  cmake: Option<PathBuf>,

  /// Git executable [env: LIBFORGE_GIT]
  #[arg(long, global = true)]
  git: Option<PathBuf>,
}

impl GlobalArgs {
  fn overrides(&self) -> ConfigOverrides {
    ConfigOverrides {
      root: self.root.clone(),
      generator: self.generator.clone(),
      cmake: self.cmake.clone(),
      git: self.git.clone(),
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Sync, configure, build and install libraries in plan order
  Build {
    /// Libraries to build (default: all)
    libraries: Vec<String>,

    /// Keep building after a library fails
    #[arg(short, long)]
    keep_going: bool,

    /// Skip git submodule sync
    #[arg(long)]
    no_sync: bool,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Initialize and update the git submodules of libraries
  Sync {
    /// Libraries to sync (default: all)
    libraries: Vec<String>,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,
  },

  /// Show the build plan for this platform
  Plan {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show which libraries have been installed
  Status {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Remove library build trees
  Clean {
    /// Libraries to clean (default: all)
    libraries: Vec<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let overrides = cli.global.overrides();

  match cli.command {
    Commands::Build {
      libraries,
      keep_going,
      no_sync,
      dry_run,
      output,
    } => cmd::cmd_build(
      overrides,
      &libraries,
      cmd::BuildFlags {
        keep_going,
        sync: !no_sync,
        dry_run,
      },
      output,
    ),
    Commands::Sync { libraries, dry_run } => cmd::cmd_sync(overrides, &libraries, dry_run),
    Commands::Plan { output } => cmd::cmd_plan(overrides, output),
    Commands::Status { output } => cmd::cmd_status(overrides, output),
    Commands::Clean { libraries } => cmd::cmd_clean(overrides, &libraries),
  }
}
