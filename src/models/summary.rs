use super::{ResourceId, StatusColor};
use serde::Serialize;

/// Title of every card and prefix of the message text
pub const NOTIFICATION_KIND: &str = "Tosca Results Submitted";

/// Everything the pipeline learned about a test run, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRunSummary {
    pub project_name: String,
    pub test_suite_name: String,
    pub test_run_name: String,
    pub status: String,
    pub status_color: StatusColor,
    pub test_run_url: String,
}

impl TestRunSummary {
    /// One-line message, e.g. `Tosca Results Submitted: Proj - Suite1 - Run1 - Passed`
    pub fn message(&self) -> String {
        format!(
            "{}: {} - {} - {} - {}",
            NOTIFICATION_KIND,
            self.project_name,
            self.test_suite_name,
            self.test_run_name,
            self.status
        )
    }
}

/// Link to the test execution tab of a test run in the qTest web UI
pub fn test_run_url(host: &str, project_id: &ResourceId, test_run_id: &ResourceId) -> String {
    format!(
        "https://{}/p/{}/portal/project#id={}&object=3&tab=testexecution",
        host, project_id, test_run_id
    )
}
