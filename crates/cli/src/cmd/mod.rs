mod build;
mod clean;
mod plan;
mod status;
mod sync;

use anyhow::{Context, Result};

use libforge_lib::plan::standard;
use libforge_lib::{BuildContext, BuildPlan, Config, ConfigOverrides};

pub use build::{BuildFlags, cmd_build};
pub use clean::cmd_clean;
pub use plan::cmd_plan;
pub use status::cmd_status;
pub use sync::cmd_sync;

fn load_context(overrides: ConfigOverrides) -> Result<BuildContext> {
  let config = Config::resolve(overrides).context("Failed to resolve configuration")?;
  Ok(BuildContext::new(config))
}

/// The validated plan for this host, narrowed to `libraries` when given.
fn load_plan(ctx: &BuildContext, libraries: &[String]) -> Result<BuildPlan> {
  let plan = standard(ctx.environment(), ctx.os());
  plan.validate().context("Build plan is invalid")?;
  Ok(plan.select(libraries)?)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}
