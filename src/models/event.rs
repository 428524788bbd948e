use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque qTest identifier.
///
/// qTest sends ids as JSON numbers in webhook payloads but some tooling
/// forwards them as strings; both forms are accepted and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ResourceId {
                fn from(id: $t) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64);

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => ResourceId(s),
            Raw::Number(n) => ResourceId(n.to_string()),
        })
    }
}

/// Payload of the qTest test-log webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub testlog: TestLogRef,
}

/// Identifies the test run a test log was submitted against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogRef {
    pub project_id: ResourceId,
    pub testrun_id: ResourceId,
}

impl InboundEvent {
    pub fn new(project_id: impl Into<ResourceId>, testrun_id: impl Into<ResourceId>) -> Self {
        Self {
            testlog: TestLogRef {
                project_id: project_id.into(),
                testrun_id: testrun_id.into(),
            },
        }
    }

    pub fn project_id(&self) -> &ResourceId {
        &self.testlog.project_id
    }

    pub fn testrun_id(&self) -> &ResourceId {
        &self.testlog.testrun_id
    }
}
