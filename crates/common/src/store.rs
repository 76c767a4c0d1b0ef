//! Latest result per stage
//!
//! Each slot holds at most one value. Writes replace the previous value
//! wholesale and there is no history.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{AnalysisResult, CombinedResult, ExecutionResult, ExplorerResult};

/// Addressable slot in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Analysis,
    Explorer,
    Combined,
    Execution,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Analysis, Slot::Explorer, Slot::Combined, Slot::Execution];
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Analysis => write!(f, "analysis"),
            Slot::Explorer => write!(f, "explorer"),
            Slot::Combined => write!(f, "combined"),
            Slot::Execution => write!(f, "execution"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explorer: Option<ExplorerResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    combined: Option<CombinedResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    execution: Option<ExecutionResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn explorer(&self) -> Option<&ExplorerResult> {
        self.explorer.as_ref()
    }

    pub fn combined(&self) -> Option<&CombinedResult> {
        self.combined.as_ref()
    }

    pub fn execution(&self) -> Option<&ExecutionResult> {
        self.execution.as_ref()
    }

    pub fn set_analysis(&mut self, result: AnalysisResult) {
        debug!(cases = result.test_cases().len(), "storing analysis result");
        self.analysis = Some(result);
    }

    pub fn set_explorer(&mut self, result: ExplorerResult) {
        debug!(pages = result.pages.len(), "storing explorer result");
        self.explorer = Some(result);
    }

    /// Stored summaries always agree with their case list.
    pub fn set_combined(&mut self, mut result: CombinedResult) {
        result.normalize();
        debug!(cases = result.test_cases.len(), "storing combined result");
        self.combined = Some(result);
    }

    pub fn set_execution(&mut self, mut result: ExecutionResult) {
        result.normalize();
        debug!(records = result.results.len(), "storing execution result");
        self.execution = Some(result);
    }

    pub fn is_present(&self, slot: Slot) -> bool {
        match slot {
            Slot::Analysis => self.analysis.is_some(),
            Slot::Explorer => self.explorer.is_some(),
            Slot::Combined => self.combined.is_some(),
            Slot::Execution => self.execution.is_some(),
        }
    }

    pub fn clear(&mut self, slot: Slot) {
        debug!(%slot, "clearing result slot");
        match slot {
            Slot::Analysis => self.analysis = None,
            Slot::Explorer => self.explorer = None,
            Slot::Combined => self.combined = None,
            Slot::Execution => self.execution = None,
        }
    }

    /// Whether `self` and `other` hold the same value (or both nothing) in `slot`
    pub fn slot_matches(&self, other: &ResultStore, slot: Slot) -> bool {
        match slot {
            Slot::Analysis => self.analysis == other.analysis,
            Slot::Explorer => self.explorer == other.explorer,
            Slot::Combined => self.combined == other.combined,
            Slot::Execution => self.execution == other.execution,
        }
    }

    /// Take `other`'s value for `slot`, including its absence
    pub fn copy_slot(&mut self, other: &ResultStore, slot: Slot) {
        match slot {
            Slot::Analysis => self.analysis = other.analysis.clone(),
            Slot::Explorer => self.explorer = other.explorer.clone(),
            Slot::Combined => self.combined = other.combined.clone(),
            Slot::Execution => self.execution = other.execution.clone(),
        }
    }

    /// Drop every stored result
    pub fn reset(&mut self) {
        for slot in Slot::ALL {
            self.clear(slot);
        }
    }

    pub fn is_empty(&self) -> bool {
        Slot::ALL.iter().all(|slot| !self.is_present(*slot))
    }
}
