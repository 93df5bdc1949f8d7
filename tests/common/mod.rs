// Common test utilities and fixtures


// Re-export commonly used items
// Note: These may appear unused in one harness but are used in the other
#[allow(unused_imports)]
pub use fixtures::TestRepo;
#[allow(unused_imports)]
pub use helpers::{echo_capability, failing_on, pipeline_with, test_pipeline_config};
