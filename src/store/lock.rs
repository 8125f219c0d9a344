//! Advisory lock serializing ticks against one plan file
//!
//! The lock file records the holder's pid. A lock left behind by a process
//! that no longer exists (killed, power loss) is taken over; where liveness
//! cannot be checked the lock must be removed by hand.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Held for the whole load, tick, save and log sequence. The lock file is
/// removed on drop.
#[derive(Debug)]
pub struct PlanLock {
    path: PathBuf,
}

impl PlanLock {
    /// Create the lock file, failing with `Locked` if a live process holds it
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match Self::try_create(&path)? {
            Some(lock) => Ok(lock),
            None => {
                let holder = std::fs::read_to_string(&path).unwrap_or_default();
                if holder_pid(&holder).is_some_and(|pid| !process_alive(pid)) {
                    tracing::warn!(
                        path = %path.display(),
                        holder = holder.trim(),
                        "Removing stale plan lock"
                    );
                    std::fs::remove_file(&path).map_err(|e| StoreError::io(&path, e))?;
                    if let Some(lock) = Self::try_create(&path)? {
                        return Ok(lock);
                    }
                }
                Err(StoreError::Locked(format!(
                    "{} held by {}; delete it if no tick is running",
                    path.display(),
                    holder.trim()
                )))
            }
        }
    }

    /// `None` when the file already exists
    fn try_create(path: &Path) -> Result<Option<Self>, StoreError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        // from here on, drop removes the file
        let lock = Self {
            path: path.to_path_buf(),
        };
        writeln!(
            file,
            "pid {} since {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        )
        .map_err(|e| StoreError::io(path, e))?;

        tracing::debug!(path = %path.display(), "Plan lock acquired");
        Ok(Some(lock))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PlanLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove plan lock");
        }
    }
}

/// Pid from a `pid <n> since <ts>` lock body
fn holder_pid(contents: &str) -> Option<u32> {
    contents
        .split_whitespace()
        .skip_while(|word| *word != "pid")
        .nth(1)?
        .parse()
        .ok()
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

/// No portable liveness check; treat the holder as alive
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}
