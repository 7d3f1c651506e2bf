use async_trait::async_trait;

use crate::core::{Deployment, GasReporter};
use crate::utils::Result;

/// Core abstraction: one independent check against a deployment
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique identifier, also used by `--only`
    fn name(&self) -> &'static str;

    /// Run the check; a failed expectation is [`HarnessError::Assertion`](crate::HarnessError::Assertion)
    async fn run(&self, deployment: &Deployment, gas: &GasReporter) -> Result<()>;
}
