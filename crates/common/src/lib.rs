//! qaflow Common Library
//!
//! Client-side core of the qaflow test-case pipeline: the typed result model,
//! the per-stage result store, action gates, card filtering, exports and the
//! stage controller that sequences backend calls.

pub mod backend;
pub mod cards;
pub mod controller;
pub mod error;
pub mod export;
pub mod gate;
pub mod stage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use backend::Backend;
pub use cards::{Card, CardBoard, CardView, FilterKey};
pub use controller::{RunOutcome, Snapshot, StageController, StageObserver, ViewState};
pub use error::{Error, Result};
pub use export::{Artifact, ExportFormat, ExportKind};
pub use gate::Gates;
pub use stage::{Panel, Stage, StageInput};
pub use store::{ResultStore, Slot};
pub use types::*;

/// qaflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default state directory
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".qaflow")
}

/// Default configuration file path
pub fn default_config_path() -> std::path::PathBuf {
    default_store_path().join("config.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
