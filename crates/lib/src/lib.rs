//! libforge-lib: build orchestration for vendored native libraries
//!
//! This crate drives CMake over a fixed set of third-party source trees,
//! installing every library into one shared prefix so later libraries (and
//! the downstream project) can find earlier ones:
//! - `toolchain`: the memoized build environment and CMake location
//! - `submodule`: idempotent `git submodule` init/update
//! - `pipeline`: configure, then Debug/release build+install for one library
//! - `plan`: the hand-ordered list of libraries and its failure policy
//! - `prefix_lock`: keeps two orchestrators from installing at once

pub mod config;
pub mod consts;
pub mod context;
pub mod library;
pub mod pipeline;
pub mod plan;
pub mod platform;
pub mod prefix_lock;
pub mod process;
pub mod submodule;
pub mod toolchain;

pub use config::{Config, ConfigOverrides};
pub use context::BuildContext;
pub use library::{Language, LibrarySpec, OptionValue, SubmoduleRef};
pub use plan::{BuildPlan, FailurePolicy, PlanReport, RunOptions};
