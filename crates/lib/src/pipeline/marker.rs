//! Install completion markers.
//!
//! A marker is written into a library's build tree once every install step
//! has succeeded. It is cleared before a rebuild starts, so a failed rebuild
//! never leaves an earlier marker behind. Deleting the build tree removes it.

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub const INSTALL_MARKER: &str = ".libforge-complete";

const MARKER_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallMarker {
  pub version: u32,
  pub library: String,
  /// Installed configurations, in install order.
  pub configs: Vec<String>,
  pub installed_at_unix: u64,
}

impl InstallMarker {
  pub fn new(library: &str, configs: &[&str]) -> Self {
    Self {
      version: MARKER_VERSION,
      library: library.to_string(),
      configs: configs.iter().map(|c| c.to_string()).collect(),
      installed_at_unix: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs(),
    }
  }
}

pub async fn write_marker(build_dir: &Path, marker: &InstallMarker) -> io::Result<()> {
  tokio::fs::create_dir_all(build_dir).await?;
  let content = serde_json::to_string_pretty(marker).map_err(io::Error::other)?;
  tokio::fs::write(build_dir.join(INSTALL_MARKER), format!("{}\n", content)).await
}

/// Remove the marker of a build tree, if any. Returns whether one existed.
pub async fn clear_marker(build_dir: &Path) -> io::Result<bool> {
  match tokio::fs::remove_file(build_dir.join(INSTALL_MARKER)).await {
    Ok(()) => Ok(true),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(err) => Err(err),
  }
}

/// Read the marker of a build tree. `None` if it has never been installed.
pub fn read_marker(build_dir: &Path) -> io::Result<Option<InstallMarker>> {
  let path = build_dir.join(INSTALL_MARKER);
  if !path.exists() {
    return Ok(None);
  }

  let content = std::fs::read_to_string(&path)?;
  let marker = serde_json::from_str(&content).map_err(io::Error::other)?;
  Ok(Some(marker))
}
