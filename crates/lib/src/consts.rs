//! Directory layout, tool names and environment variable names.

/// Directory (relative to the root) holding the library source trees.
pub const LIBRARIES_DIR: &str = "libraries";

/// Directory (relative to the root) holding one generated build tree per library.
pub const BUILD_DIR: &str = "build";

/// Shared install prefix, relative to the root.
pub const PREFIX_DIR: &str = "local";

/// CMake program searched on PATH when no override is given.
pub const CMAKE: &str = "cmake";
/// Default git program for submodule syncs.
pub const GIT: &str = "git";

/// Repository root override.
pub const ENV_ROOT: &str = "LIBFORGE_ROOT";
/// CMake generator override.
pub const ENV_GENERATOR: &str = "LIBFORGE_GENERATOR";
/// CMake program override.
pub const ENV_CMAKE: &str = "LIBFORGE_CMAKE";
/// Git program override.
pub const ENV_GIT: &str = "LIBFORGE_GIT";
