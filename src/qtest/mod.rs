//! qTest Manager REST API (v3) access.
//!
//! The pipeline only talks to qTest through [`QTestApi`], so tests can swap
//! the HTTP client for a deterministic stub.

pub mod client;

pub use client::QTestClient;

use crate::error::Result;
use crate::models::{Project, ResourceId, TestRun, TestSuite};
use async_trait::async_trait;

/// Read operations the relay needs from qTest
#[async_trait]
pub trait QTestApi: Send + Sync {
    /// Fetch a test run including its Tosca properties
    async fn fetch_test_run(&self, project_id: &ResourceId, test_run_id: &ResourceId)
        -> Result<TestRun>;

    /// Fetch a project
    async fn fetch_project(&self, project_id: &ResourceId) -> Result<Project>;

    /// Fetch a test suite
    async fn fetch_test_suite(&self, project_id: &ResourceId, test_suite_id: &ResourceId)
        -> Result<TestSuite>;
}
