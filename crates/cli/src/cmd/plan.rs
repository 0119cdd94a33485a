//! Implementation of the `libforge plan` command.

use anyhow::Result;
use serde_json::json;

use libforge_lib::ConfigOverrides;

use super::{load_context, load_plan};
use crate::output::{OutputFormat, print_json, print_stat};

/// Print the plan this host would build, with every option rendered.
pub fn cmd_plan(overrides: ConfigOverrides, output: OutputFormat) -> Result<()> {
  let ctx = load_context(overrides)?;
  let plan = load_plan(&ctx, &[])?;
  let env = ctx.environment();
  let prefix = ctx.prefix();

  if output.is_json() {
    return print_json(&json!({
      "root": ctx.config().root,
      "prefix": prefix,
      "generator": env.generator,
      "flags": env.flags,
      "libraries": plan.entries(),
    }));
  }

  print_stat("Root", &ctx.config().root.display().to_string());
  print_stat("Prefix", &prefix.display().to_string());
  print_stat("Generator", &env.generator);
  println!();

  for (index, entry) in plan.entries().iter().enumerate() {
    let spec = &entry.spec;
    println!(
      "{:>2}. {} [{}] {}",
      index + 1,
      spec.name,
      spec.language,
      spec.install_configs().join(" + ")
    );
    println!("      source: {}", spec.source_path(ctx.config()).display());
    if !spec.depends_on.is_empty() {
      println!("      after:  {}", spec.depends_on.join(", "));
    }
    for submodule in &spec.submodules {
      match &submodule.parent {
        Some(parent) => println!("      sync:   {} (in {})", submodule.path.display(), parent.display()),
        None => println!("      sync:   {}", submodule.path.display()),
      }
    }
    for (key, value) in &spec.options {
      println!("      -D{}={}", key, value.render(&prefix));
    }
    if let Some(flags) = &spec.cxxflags {
      println!("      CXXFLAGS={}", flags.join(" "));
    }
  }

  Ok(())
}
