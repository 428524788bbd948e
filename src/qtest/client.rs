use super::QTestApi;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Project, ResourceId, TestRun, TestSuite};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed qTest API client
#[derive(Clone)]
pub struct QTestClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) token: String,
    pub(crate) timeout_secs: u64,
}

impl QTestClient {
    /// Create a client for `https://{host}/api/v3`
    pub fn new(host: &str, token: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(format!("https://{}/api/v3", host), token, timeout_secs)
    }

    /// Create a client against an explicit API base URL
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("qtest-teams-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}` with bearer auth and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, target: &str, path: &str) -> Result<T> {
        let result = self.request(target, path).await;
        metrics::record_upstream(target, result.is_ok());
        result
    }

    async fn request<T: DeserializeOwned>(&self, target: &str, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "qTest request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::from_transport("qTest", e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::integration(
                "qtest",
                format!(
                    "{} returned status {}: {}",
                    target,
                    status,
                    if body.is_empty() { "No response body" } else { &body }
                ),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Serialization(format!("Failed to parse {} response: {}", target, e)))
    }
}

#[async_trait]
impl QTestApi for QTestClient {
    async fn fetch_test_run(
        &self,
        project_id: &ResourceId,
        test_run_id: &ResourceId,
    ) -> Result<TestRun> {
        self.get_json(
            "test_run",
            &format!(
                "/projects/{}/test-runs/{}?includeToscaProperties=true",
                project_id, test_run_id
            ),
        )
        .await
    }

    async fn fetch_project(&self, project_id: &ResourceId) -> Result<Project> {
        self.get_json("project", &format!("/projects/{}", project_id))
            .await
    }

    async fn fetch_test_suite(
        &self,
        project_id: &ResourceId,
        test_suite_id: &ResourceId,
    ) -> Result<TestSuite> {
        self.get_json(
            "test_suite",
            &format!("/projects/{}/test-suites/{}", project_id, test_suite_id),
        )
        .await
    }
}
