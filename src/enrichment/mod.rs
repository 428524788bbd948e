/// Test-run enrichment.
///
/// Turns a qTest test-log webhook event into a Teams notification by
/// reading the test run, its project and its test suite from qTest.
pub mod pipeline;

pub use pipeline::EnrichmentPipeline;
