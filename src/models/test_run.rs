use super::ResourceId;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, IntoStaticStr};

/// `parentType` value of test runs that live inside a test suite
pub const TEST_SUITE_PARENT: &str = "test-suite";

/// Name of the test-run property carrying the latest test-log status
pub const STATUS_FIELD: &str = "Status";

/// qTest test run as returned by `GET /projects/{id}/test-runs/{id}?includeToscaProperties=true`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestRun {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Only present on runs created by Tosca
    #[serde(default)]
    pub tosca_guid: Option<String>,

    #[serde(rename = "parentId", default)]
    pub parent_id: Option<ResourceId>,

    #[serde(rename = "parentType", default)]
    pub parent_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Vec<Property>,
}

/// One `{field_name, field_value_name}` entry of a test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_name: String,

    #[serde(default)]
    pub field_value_name: Option<String>,
}

impl TestRun {
    /// Tosca GUID, treating an empty string like an absent one
    pub fn tosca_guid(&self) -> Option<&str> {
        self.tosca_guid.as_deref().filter(|guid| !guid.is_empty())
    }

    /// Display value of the first `Status` property.
    ///
    /// A `Status` entry whose `field_value_name` is null counts as missing.
    pub fn status(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.field_name == STATUS_FIELD)
            .and_then(|p| p.field_value_name.as_deref())
    }

    pub fn is_in_test_suite(&self) -> bool {
        self.parent_type.as_deref() == Some(TEST_SUITE_PARENT)
    }
}

/// Non-Tosca runs must reach the Tosca check, so nulls in fields read
/// later fall back to the empty value instead of failing the decode.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// qTest project, only the fields the relay reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
}

/// qTest test suite, only the fields the relay reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
}

/// Adaptive Card text colors used for the test-log status fact
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr,
)]
pub enum StatusColor {
    Good,
    Attention,
    Warning,
    Default,
}

impl StatusColor {
    /// Color for a test-log status. Unknown statuses get `Default`.
    pub fn for_status(status: &str) -> Self {
        match status {
            "Passed" => StatusColor::Good,
            "Failed" => StatusColor::Attention,
            "Blocked" | "Skipped" => StatusColor::Warning,
            _ => StatusColor::Default,
        }
    }
}
