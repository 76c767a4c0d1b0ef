//! CLI Commands

pub mod cases;
pub mod config;
pub mod export;
pub mod session;
pub mod stage;

use anyhow::Result;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use qaflow_common::{Snapshot, Stage, StageController};

use crate::client::HttpBackend;
use crate::config::CliConfig;
use crate::output::OutputFormat;
use crate::progress::TerminalObserver;
use crate::session::{LockGuard, Session};

/// Everything a command needs: the resumed controller, config and output format
pub struct Context {
    pub controller: StageController,
    pub backend: HttpBackend,
    pub config: CliConfig,
    pub format: OutputFormat,
    session: Session,
    /// Snapshot as loaded, to tell which slots this invocation changed
    base: Snapshot,
    stage_locks: Mutex<Vec<LockGuard>>,
}

impl Context {
    /// Resume the saved session against the configured backend
    pub fn open(config: CliConfig, format: OutputFormat) -> Result<Self> {
        let backend = HttpBackend::new(&config.backend_url)
            .map_err(|e| anyhow::anyhow!("creating backend client: {}", e))?;
        let session = Session::new(config.session_path());
        let base = session.load()?;
        let observer = Arc::new(TerminalObserver::new(format == OutputFormat::Json));
        let controller = StageController::from_snapshot(Arc::new(backend.clone()), base.clone())
            .with_observer(observer);

        Ok(Self {
            controller,
            backend,
            config,
            format,
            session,
            base,
            stage_locks: Mutex::new(Vec::new()),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Claim `stage` across processes until this context is dropped.
    /// Returns false when another invocation is running it.
    pub fn claim_stage(&self, stage: Stage) -> Result<bool> {
        match self.session.try_stage_lock(stage)? {
            Some(guard) => {
                self.stage_locks.lock().push(guard);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Merge this invocation's changes into the saved session
    pub fn save(&self) -> Result<()> {
        self.session.commit(&self.base, self.controller.snapshot())?;
        Ok(())
    }

    /// Resolve an output directory, defaulting to the configured export dir
    pub fn output_dir(&self, requested: Option<PathBuf>) -> PathBuf {
        requested.unwrap_or_else(|| self.config.export_dir.clone())
    }
}

/// Write bytes under `dir`, creating it if needed
pub fn write_file(dir: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, contents)?;
    Ok(path)
}
