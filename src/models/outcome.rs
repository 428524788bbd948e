use serde::Serialize;
use strum::IntoStaticStr;

/// Result of one pipeline run.
///
/// `process` always produces one of these; failures are reported here and
/// in the logs, never raised to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineOutcome {
    /// Card was accepted by the chat webhook
    Delivered { status_code: u16 },

    /// Event is not relevant (not a Tosca run)
    Skipped { reason: String },

    /// Processing stopped on a data or upstream error
    Failed { reason: String },
}

impl PipelineOutcome {
    /// Metrics label
    pub fn label(&self) -> &'static str {
        self.into()
    }
}
