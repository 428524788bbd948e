use crate::config::{Config, RelayConfig};
use crate::error::{AppError, Result};
use crate::metrics::{EVENTS_TOTAL, PIPELINE_DURATION_SECONDS};
use crate::models::{
    test_run_url, InboundEvent, PipelineOutcome, ResourceId, StatusColor, TestRun,
    TestRunSummary,
};
use crate::notifications::{CardSender, TeamsMessage, TeamsSender};
use crate::qtest::{QTestApi, QTestClient};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Why a run stopped before delivering a card
#[derive(Debug)]
enum Halt {
    /// Expected early exit, logged at info
    Skip(String),

    /// Data or upstream problem, logged at error
    Abort(AppError),
}

impl From<AppError> for Halt {
    fn from(err: AppError) -> Self {
        Halt::Abort(err)
    }
}

/// Enrichment pipeline: test run -> project -> test suite -> Teams card.
///
/// Each step needs the previous step's output, so the calls run strictly
/// in order. Any number of `process` calls may run concurrently; the
/// pipeline holds no mutable state.
pub struct EnrichmentPipeline {
    qtest: Arc<dyn QTestApi>,
    sender: Arc<dyn CardSender>,
    config: Arc<RelayConfig>,
}

impl EnrichmentPipeline {
    /// Create a pipeline over explicit collaborators
    pub fn new(
        config: RelayConfig,
        qtest: Arc<dyn QTestApi>,
        sender: Arc<dyn CardSender>,
    ) -> Self {
        Self {
            qtest,
            sender,
            config: Arc::new(config),
        }
    }

    /// Create a pipeline talking to the real qTest and Teams endpoints
    pub fn from_config(config: &Config) -> Result<Self> {
        let relay = config.relay()?;
        let qtest = QTestClient::new(
            &relay.api_host,
            relay.api_token.clone(),
            config.qtest.request_timeout_secs,
        )?;
        let sender = TeamsSender::new(relay.webhook_url.clone(), config.teams.request_timeout_secs)?;

        Ok(Self::new(relay, Arc::new(qtest), Arc::new(sender)))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the pipeline for one event.
    ///
    /// Never fails: every error is logged and reported as
    /// [`PipelineOutcome::Failed`]. At most one card is sent.
    pub async fn process(&self, event: &InboundEvent) -> PipelineOutcome {
        let start = Instant::now();
        let span = info_span!(
            "process_testlog",
            invocation_id = %Uuid::new_v4(),
            project_id = %event.project_id(),
            testrun_id = %event.testrun_id(),
        );

        let outcome = async {
            match self.run(event).await {
                Ok(status_code) => {
                    info!(status_code, "Notification delivered");
                    PipelineOutcome::Delivered { status_code }
                }
                Err(Halt::Skip(reason)) => {
                    info!("{}, stopping further processing", reason);
                    PipelineOutcome::Skipped { reason }
                }
                Err(Halt::Abort(e)) => {
                    error!(error = %e, "Error occurred during execution");
                    PipelineOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await;

        EVENTS_TOTAL.with_label_values(&[outcome.label()]).inc();
        PIPELINE_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        outcome
    }

    async fn run(&self, event: &InboundEvent) -> std::result::Result<u16, Halt> {
        let summary = self.enrich(event).await?;
        let message = TeamsMessage::for_test_run(&summary);

        info!(text = %summary.message(), "Sending Teams card");
        Ok(self.sender.send_card(&message).await?)
    }

    /// Fetch everything the card needs, stopping at the first failed guard
    async fn enrich(&self, event: &InboundEvent) -> std::result::Result<TestRunSummary, Halt> {
        let project_id = event.project_id();
        let testrun_id = event.testrun_id();

        let test_run = self.qtest.fetch_test_run(project_id, testrun_id).await?;

        Self::require_tosca(&test_run)?;
        let status = Self::require_status(&test_run)?;
        let status_color = StatusColor::for_status(status);

        let project = self.qtest.fetch_project(project_id).await?;

        let parent_id = Self::require_suite_parent(&test_run)?;
        let test_suite = self.qtest.fetch_test_suite(project_id, parent_id).await?;

        Ok(TestRunSummary {
            project_name: project.name,
            test_suite_name: test_suite.name,
            test_run_name: test_run.name.clone(),
            status: status.to_string(),
            status_color,
            test_run_url: test_run_url(&self.config.api_host, project_id, testrun_id),
        })
    }

    /// Only runs created by Tosca carry a GUID
    fn require_tosca(test_run: &TestRun) -> std::result::Result<(), Halt> {
        match test_run.tosca_guid() {
            Some(_) => Ok(()),
            None => Err(Halt::Skip("This is not a Tosca test result".to_string())),
        }
    }

    fn require_status(test_run: &TestRun) -> std::result::Result<&str, Halt> {
        test_run.status().ok_or_else(|| {
            Halt::Abort(AppError::MissingField(
                "Status field not found in test run properties".to_string(),
            ))
        })
    }

    fn require_suite_parent(test_run: &TestRun) -> std::result::Result<&ResourceId, Halt> {
        if !test_run.is_in_test_suite() {
            return Err(Halt::Abort(AppError::UnsupportedParent(format!(
                "Parent is not a test-suite (parentType: {})",
                test_run.parent_type.as_deref().unwrap_or("none")
            ))));
        }

        test_run.parent_id.as_ref().ok_or_else(|| {
            Halt::Abort(AppError::MissingField(
                "parentId missing on test-suite test run".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Property, TestSuite};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned qTest responses; `None` makes the call fail
    struct StubQTest {
        test_run: Option<TestRun>,
        project: Option<Project>,
        test_suite: Option<TestSuite>,
        calls: AtomicUsize,
        requested_suite: Mutex<Option<ResourceId>>,
    }

    impl StubQTest {
        fn new(test_run: TestRun) -> Self {
            Self {
                test_run: Some(test_run),
                project: Some(Project { name: "Proj".to_string() }),
                test_suite: Some(TestSuite { name: "Suite1".to_string() }),
                calls: AtomicUsize::new(0),
                requested_suite: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QTestApi for StubQTest {
        async fn fetch_test_run(&self, _: &ResourceId, _: &ResourceId) -> Result<TestRun> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.test_run
                .clone()
                .ok_or_else(|| AppError::Network("connection refused".to_string()))
        }

        async fn fetch_project(&self, _: &ResourceId) -> Result<Project> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.project
                .clone()
                .ok_or_else(|| AppError::integration("qtest", "project returned status 404"))
        }

        async fn fetch_test_suite(&self, _: &ResourceId, suite_id: &ResourceId) -> Result<TestSuite> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.requested_suite.lock().unwrap() = Some(suite_id.clone());
            self.test_suite
                .clone()
                .ok_or_else(|| AppError::integration("qtest", "test_suite returned status 500"))
        }
    }

    #[derive(Default)]
    struct StubSender {
        sent: Mutex<Vec<TeamsMessage>>,
        fail: bool,
    }

    impl StubSender {
        fn sent(&self) -> Vec<TeamsMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CardSender for StubSender {
        async fn send_card(&self, message: &TeamsMessage) -> Result<u16> {
            if self.fail {
                return Err(AppError::Timeout("Teams webhook request timed out".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(200)
        }
    }

    fn tosca_run(status: &str) -> TestRun {
        TestRun {
            name: "Run1".to_string(),
            tosca_guid: Some("abc".to_string()),
            parent_id: Some(ResourceId::from(42)),
            parent_type: Some("test-suite".to_string()),
            properties: vec![Property {
                field_name: "Status".to_string(),
                field_value_name: Some(status.to_string()),
            }],
        }
    }

    fn pipeline(qtest: Arc<StubQTest>, sender: Arc<StubSender>) -> EnrichmentPipeline {
        let config = RelayConfig::new("token", "example.qtest.com", "https://hook").unwrap();
        EnrichmentPipeline::new(config, qtest, sender)
    }

    fn event() -> InboundEvent {
        InboundEvent::new(7, 99)
    }

    #[tokio::test]
    async fn test_end_to_end_delivery() {
        let qtest = Arc::new(StubQTest::new(tosca_run("Passed")));
        let sender = Arc::new(StubSender::default());

        let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

        assert_eq!(outcome, PipelineOutcome::Delivered { status_code: 200 });
        assert_eq!(qtest.calls(), 3);
        assert_eq!(*qtest.requested_suite.lock().unwrap(), Some(ResourceId::from(42)));

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        let status_fact = sent[0]
            .card()
            .unwrap()
            .facts()
            .find(|f| f.title == "Test Log Status:")
            .cloned()
            .unwrap();
        assert_eq!(status_fact.value, "Passed");
        assert_eq!(status_fact.color, Some(StatusColor::Good));
    }

    #[tokio::test]
    async fn test_enrich_builds_summary() {
        let qtest = Arc::new(StubQTest::new(tosca_run("Passed")));
        let sender = Arc::new(StubSender::default());

        let summary = pipeline(qtest, sender).enrich(&event()).await.unwrap();

        assert_eq!(
            summary.message(),
            "Tosca Results Submitted: Proj - Suite1 - Run1 - Passed"
        );
        assert_eq!(summary.status_color, StatusColor::Good);
        assert_eq!(
            summary.test_run_url,
            "https://example.qtest.com/p/7/portal/project#id=99&object=3&tab=testexecution"
        );
    }

    #[tokio::test]
    async fn test_skip_without_tosca_guid() {
        for guid in [None, Some(String::new())] {
            let mut run = tosca_run("Passed");
            run.tosca_guid = guid;
            let qtest = Arc::new(StubQTest::new(run));
            let sender = Arc::new(StubSender::default());

            let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

            assert!(matches!(outcome, PipelineOutcome::Skipped { .. }));
            assert_eq!(qtest.calls(), 1);
            assert!(sender.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_status_fails_after_one_call() {
        let mut run = tosca_run("Passed");
        run.properties = vec![Property {
            field_name: "Priority".to_string(),
            field_value_name: Some("High".to_string()),
        }];
        let qtest = Arc::new(StubQTest::new(run));
        let sender = Arc::new(StubSender::default());

        let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

        match outcome {
            PipelineOutcome::Failed { reason } => assert!(reason.contains("Status")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(qtest.calls(), 1);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_suite_parent_fails_after_two_calls() {
        let mut run = tosca_run("Failed");
        run.parent_type = Some("release".to_string());
        let qtest = Arc::new(StubQTest::new(run));
        let sender = Arc::new(StubSender::default());

        let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

        match outcome {
            PipelineOutcome::Failed { reason } => assert!(reason.contains("test-suite")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(qtest.calls(), 2);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_suite_run_without_parent_id_fails_after_two_calls() {
        let mut run = tosca_run("Passed");
        run.parent_id = None;
        let qtest = Arc::new(StubQTest::new(run));
        let sender = Arc::new(StubSender::default());

        let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

        match outcome {
            PipelineOutcome::Failed { reason } => assert!(reason.contains("parentId")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(qtest.calls(), 2);
        assert!(qtest.requested_suite.lock().unwrap().is_none());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_sparse_non_tosca_run_is_skipped() {
        let run: TestRun =
            serde_json::from_str(r#"{"name":null,"parentType":null,"properties":null}"#).unwrap();
        let qtest = Arc::new(StubQTest::new(run));
        let sender = Arc::new(StubSender::default());

        let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

        assert!(matches!(outcome, PipelineOutcome::Skipped { .. }));
        assert_eq!(qtest.calls(), 1);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failures_are_contained() {
        let mut failing_run = StubQTest::new(tosca_run("Passed"));
        failing_run.test_run = None;
        let mut failing_project = StubQTest::new(tosca_run("Passed"));
        failing_project.project = None;
        let mut failing_suite = StubQTest::new(tosca_run("Passed"));
        failing_suite.test_suite = None;

        for (qtest, expected_calls) in [(failing_run, 1), (failing_project, 2), (failing_suite, 3)] {
            let qtest = Arc::new(qtest);
            let sender = Arc::new(StubSender::default());

            let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

            assert!(matches!(outcome, PipelineOutcome::Failed { .. }));
            assert_eq!(qtest.calls(), expected_calls);
            assert!(sender.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_send_failure_is_contained() {
        let qtest = Arc::new(StubQTest::new(tosca_run("Blocked")));
        let sender = Arc::new(StubSender {
            fail: true,
            ..Default::default()
        });

        let outcome = pipeline(qtest.clone(), sender.clone()).process(&event()).await;

        assert!(matches!(outcome, PipelineOutcome::Failed { .. }));
        assert_eq!(qtest.calls(), 3);
    }

    #[test]
    fn test_guards() {
        let run = tosca_run("Skipped");
        assert!(EnrichmentPipeline::require_tosca(&run).is_ok());
        assert_eq!(EnrichmentPipeline::require_status(&run).unwrap(), "Skipped");
        assert_eq!(
            EnrichmentPipeline::require_suite_parent(&run).unwrap(),
            &ResourceId::from(42)
        );

        let mut orphan = tosca_run("Passed");
        orphan.parent_id = None;
        assert!(matches!(
            EnrichmentPipeline::require_suite_parent(&orphan),
            Err(Halt::Abort(AppError::MissingField(_)))
        ));

        let mut manual = tosca_run("Passed");
        manual.tosca_guid = None;
        assert!(matches!(
            EnrichmentPipeline::require_tosca(&manual),
            Err(Halt::Skip(_))
        ));
    }
}
