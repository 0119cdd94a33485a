//! Advisory lock on the shared install prefix.
//!
//! Every library installs into the same prefix, so two orchestrators running
//! against one checkout would interleave installs. Mutating commands hold an
//! exclusive lock on `<prefix>/.lock`; read-only commands take a shared one.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const LOCK_FILENAME: &str = ".lock";
const METADATA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
  Shared,
  Exclusive,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LockMetadata {
  pub version: u32,
  pub pid: u32,
  pub started_at_unix: u64,
  pub command: String,
  pub prefix: PathBuf,
}

#[derive(Debug, Error)]
pub enum PrefixLockError {
  #[error(
    "prefix is locked by another process: {command} (PID {pid}, started at unix time {started_at_unix})\n\
     If no libforge process is running, remove the lock file:\n  {lock_path}"
  )]
  Contention {
    command: String,
    pid: u32,
    started_at_unix: u64,
    lock_path: PathBuf,
  },

  #[error(
    "prefix is locked (could not read lock metadata)\n\
     If no libforge process is running, remove the lock file:\n  {lock_path}"
  )]
  ContentionUnknown { lock_path: PathBuf },

  #[error("failed to create prefix directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to open lock file: {0}")]
  OpenFile(#[source] io::Error),

  #[error("failed to write lock metadata: {0}")]
  WriteMetadata(#[source] io::Error),

  #[error("failed to acquire lock: {0}")]
  LockFailed(#[source] io::Error),
}

/// Held for as long as the value lives; the OS releases it on drop.
#[derive(Debug)]
pub struct PrefixLock {
  file: File,
  lock_path: PathBuf,
}

impl PrefixLock {
  /// Lock `prefix` without waiting, creating it if needed.
  ///
  /// Exclusive holders record who they are so a blocked caller can say so.
  pub fn acquire(prefix: &Path, mode: LockMode, command: &str) -> Result<Self, PrefixLockError> {
    let lock_path = prefix.join(LOCK_FILENAME);

    if !prefix.exists() {
      std::fs::create_dir_all(prefix).map_err(PrefixLockError::CreateDir)?;
    }

    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(&lock_path)
      .map_err(PrefixLockError::OpenFile)?;

    if let Err(err) = try_lock(&file, mode) {
      if err.kind() == io::ErrorKind::WouldBlock {
        return Err(read_contention_error(&lock_path));
      }
      return Err(PrefixLockError::LockFailed(err));
    }

    if mode == LockMode::Exclusive {
      write_metadata(&file, command, prefix)?;
    }

    debug!(path = %lock_path.display(), ?mode, "acquired prefix lock");
    Ok(PrefixLock { file, lock_path })
  }

  /// Metadata read back through the held handle.
  ///
  /// Opening a second handle would fail on Windows, where locks are mandatory.
  pub fn read_metadata(&self) -> io::Result<LockMetadata> {
    let mut file = &self.file;
    file.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    serde_json::from_str(&contents).map_err(io::Error::other)
  }

  pub fn lock_path(&self) -> &Path {
    &self.lock_path
  }
}

fn write_metadata(file: &File, command: &str, prefix: &Path) -> Result<(), PrefixLockError> {
  let metadata = LockMetadata {
    version: METADATA_VERSION,
    pid: std::process::id(),
    started_at_unix: SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap_or_default()
      .as_secs(),
    command: command.to_string(),
    prefix: prefix.to_path_buf(),
  };

  file.set_len(0).map_err(PrefixLockError::WriteMetadata)?;
  let mut writer = io::BufWriter::new(file);
  writer
    .seek(SeekFrom::Start(0))
    .map_err(PrefixLockError::WriteMetadata)?;
  serde_json::to_writer_pretty(&mut writer, &metadata)
    .map_err(|e| PrefixLockError::WriteMetadata(io::Error::other(e)))?;
  writer.flush().map_err(PrefixLockError::WriteMetadata)?;

  Ok(())
}

fn read_contention_error(lock_path: &Path) -> PrefixLockError {
  let metadata = std::fs::read_to_string(lock_path)
    .ok()
    .and_then(|contents| serde_json::from_str::<LockMetadata>(&contents).ok());

  match metadata {
    Some(metadata) => PrefixLockError::Contention {
      command: metadata.command,
      pid: metadata.pid,
      started_at_unix: metadata.started_at_unix,
      lock_path: lock_path.to_path_buf(),
    },
    None => PrefixLockError::ContentionUnknown {
      lock_path: lock_path.to_path_buf(),
    },
  }
}

#[cfg(unix)]
fn try_lock(file: &File, mode: LockMode) -> io::Result<()> {
  use rustix::fs::{FlockOperation, flock};
  use std::os::unix::io::AsFd;

  let operation = match mode {
    LockMode::Shared => FlockOperation::NonBlockingLockShared,
    LockMode::Exclusive => FlockOperation::NonBlockingLockExclusive,
  };

  flock(file.as_fd(), operation).map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(windows)]
fn try_lock(file: &File, mode: LockMode) -> io::Result<()> {
  use std::os::windows::io::AsRawHandle;
  use windows_sys::Win32::Foundation::HANDLE;
  use windows_sys::Win32::Storage::FileSystem::{LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx};

  let handle = file.as_raw_handle() as HANDLE;
  let flags = match mode {
    LockMode::Shared => LOCKFILE_FAIL_IMMEDIATELY,
    LockMode::Exclusive => LOCKFILE_FAIL_IMMEDIATELY | LOCKFILE_EXCLUSIVE_LOCK,
  };

  // SAFETY: a zeroed OVERLAPPED is valid and the handle is owned by `file`.
  let result = unsafe {
    let mut overlapped = std::mem::zeroed();
    LockFileEx(handle, flags, 0, 1, 0, &mut overlapped)
  };

  if result == 0 {
    Err(io::Error::last_os_error())
  } else {
    Ok(())
  }
}
