//! Boundary to the analysis/crawl/automation backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AnalysisResult, CombinedResult, CombinedTestCase, ExecutionResult, ExplorerResult};

/// Backend calls, one per stage.
///
/// Implementations report a request that could not complete as
/// [`Error::Transport`](crate::Error::Transport) and a non-success response as
/// [`Error::Backend`](crate::Error::Backend).
#[async_trait]
pub trait Backend: Send + Sync {
    async fn analyze(&self, story: &str) -> Result<AnalysisResult>;

    async fn explore(&self, url: &str, depth: u32) -> Result<ExplorerResult>;

    async fn combine(&self, story: &str, url: &str, depth: u32) -> Result<CombinedResult>;

    async fn execute(&self, test_cases: &[CombinedTestCase], headless: bool) -> Result<ExecutionResult>;

    /// Returns the generated document body
    async fn generate_report(&self, results: &ExecutionResult) -> Result<String>;

    /// Fetch the most recently generated report as served by the backend
    async fn download_report(&self) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub story: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExploreRequest<'a> {
    pub url: &'a str,
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombineRequest<'a> {
    pub story: &'a str,
    pub url: &'a str,
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest<'a> {
    pub test_cases: &'a [CombinedTestCase],
    pub headless: bool,
}

/// Body of a failed backend response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extract the `error` message from a response body, if it has one
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.error)
    }
}
