//! Session persistence between CLI invocations
//!
//! Each command resumes the controller from `session.json`, runs, and commits
//! the slots it changed back so stages can be chained across invocations.
//! Commits from concurrent invocations are merged slot by slot under a lock
//! file, and a per-stage lock keeps a stage in flight in one process at most.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use qaflow_common::{Slot, Snapshot, Stage};

const SESSION_LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const SESSION_LOCK_STALE_AFTER: Duration = Duration::from_secs(30);
/// Crawls and browser runs can be long; a stage lock older than this is
/// assumed to belong to a process that died
const STAGE_LOCK_STALE_AFTER: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub saved_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Removes its lock file when dropped
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating lock directory {}", parent.display()))?;
    }
    Ok(())
}

/// One attempt at creating the lock file. `Ok(None)` when another live
/// holder has it.
fn try_acquire(path: &Path, stale_after: Duration) -> Result<Option<LockGuard>> {
    create_parent(path)?;
    loop {
        match OpenOptions::new().create_new(true).write(true).open(path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                return Ok(Some(LockGuard {
                    path: path.to_path_buf(),
                }));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if reclaim_stale_lock(path, stale_after) {
                    warn!(path = %path.display(), "reclaimed stale lock");
                    continue;
                }
                return Ok(None);
            }
            Err(e) => return Err(anyhow!("failed to acquire lock {}: {}", path.display(), e)),
        }
    }
}

/// Wait for the lock file, giving up after `timeout`
pub fn acquire_lock(path: &Path, timeout: Duration, stale_after: Duration) -> Result<LockGuard> {
    let start = SystemTime::now();
    loop {
        if let Some(guard) = try_acquire(path, stale_after)? {
            return Ok(guard);
        }
        let elapsed = SystemTime::now().duration_since(start).unwrap_or_default();
        if elapsed >= timeout {
            bail!("timed out acquiring lock {}", path.display());
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn reclaim_stale_lock(path: &Path, stale_after: Duration) -> bool {
    let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    if age < stale_after {
        return false;
    }
    fs::remove_file(path).is_ok()
}

/// On-disk session location
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn stage_lock_path(&self, stage: Stage) -> PathBuf {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        dir.join(format!("{}.lock", stage))
    }

    /// Claim `stage` for this process. `Ok(None)` when another invocation
    /// is already running it.
    pub fn try_stage_lock(&self, stage: Stage) -> Result<Option<LockGuard>> {
        let guard = try_acquire(&self.stage_lock_path(stage), STAGE_LOCK_STALE_AFTER)?;
        if guard.is_none() {
            debug!(%stage, "stage locked by another process");
        }
        Ok(guard)
    }

    /// Load the saved snapshot, or an empty one when no session exists
    pub fn load(&self) -> Result<Snapshot> {
        Ok(self.load_file()?.map(|f| f.snapshot).unwrap_or_default())
    }

    pub fn load_file(&self) -> Result<Option<SessionFile>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved session");
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading session {}", self.path.display()))?;
        let file: SessionFile = serde_json::from_str(&content)
            .with_context(|| format!("parsing session {}", self.path.display()))?;
        Ok(Some(file))
    }

    /// Overwrite the session with `snapshot`
    pub fn save(&self, snapshot: Snapshot) -> Result<()> {
        create_parent(&self.path)?;
        let file = SessionFile {
            saved_at: Utc::now(),
            snapshot,
        };
        let content = serde_json::to_string_pretty(&file)?;
        // Replaced atomically via rename
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Write back what changed between `base` (as loaded) and `current`.
    ///
    /// The latest file is re-read under the session lock; only slots and the
    /// report that this process changed replace what is on disk. The view
    /// always comes from `current`.
    pub fn commit(&self, base: &Snapshot, current: Snapshot) -> Result<Snapshot> {
        let _lock = acquire_lock(&self.lock_path(), SESSION_LOCK_TIMEOUT, SESSION_LOCK_STALE_AFTER)?;
        let mut merged = self.load()?;

        for slot in Slot::ALL {
            if !current.store.slot_matches(&base.store, slot) {
                debug!(%slot, "committing changed slot");
                merged.store.copy_slot(&current.store, slot);
            }
        }
        if current.report != base.report {
            merged.report = current.report;
        }
        merged.view = current.view;

        self.save(merged.clone())?;
        Ok(merged)
    }

    /// Delete the saved session
    pub fn clear(&self) -> Result<()> {
        let _lock = acquire_lock(&self.lock_path(), SESSION_LOCK_TIMEOUT, SESSION_LOCK_STALE_AFTER)?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "session removed");
        }
        Ok(())
    }
}
