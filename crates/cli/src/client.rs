//! Backend HTTP Client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use qaflow_common::backend::{
    AnalyzeRequest, CombineRequest, ErrorBody, ExecuteRequest, ExploreRequest,
};
use qaflow_common::{
    AnalysisResult, Backend, CombinedResult, CombinedTestCase, Error, ExecutionResult,
    ExplorerResult, Result, Stage,
};

const DOWNLOAD_PATH: &str = "/report/download";

/// Client for the qaflow backend's JSON endpoints
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    /// Create a client. No request timeout is set; long crawls and browser
    /// runs are bounded by the backend.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("qaflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if the backend answers at all
    pub async fn health_check(&self) -> bool {
        self.http.get(self.url("/")).send().await.is_ok()
    }

    async fn send(&self, stage: Stage, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%stage, %status, "backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::backend(stage, ErrorBody::message_from(&body)))
    }

    async fn post_json<B, T>(&self, stage: Stage, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(stage.endpoint())).json(body);
        let response = self.send(stage, request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            Error::backend(stage, Some(format!("Unexpected response from backend: {}", e)))
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn analyze(&self, story: &str) -> Result<AnalysisResult> {
        self.post_json(Stage::Analyze, &AnalyzeRequest { story }).await
    }

    async fn explore(&self, url: &str, depth: u32) -> Result<ExplorerResult> {
        self.post_json(Stage::Explore, &ExploreRequest { url, depth }).await
    }

    async fn combine(&self, story: &str, url: &str, depth: u32) -> Result<CombinedResult> {
        self.post_json(Stage::Combine, &CombineRequest { story, url, depth })
            .await
    }

    async fn execute(&self, test_cases: &[CombinedTestCase], headless: bool) -> Result<ExecutionResult> {
        self.post_json(Stage::Execute, &ExecuteRequest { test_cases, headless })
            .await
    }

    async fn generate_report(&self, results: &ExecutionResult) -> Result<String> {
        let request = self.http.post(self.url(Stage::Report.endpoint())).json(results);
        let response = self.send(Stage::Report, request).await?;
        response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn download_report(&self) -> Result<Vec<u8>> {
        let request = self.http.get(self.url(DOWNLOAD_PATH));
        let response = self.send(Stage::Report, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
