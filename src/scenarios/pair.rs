use async_trait::async_trait;
use ethers::types::Address;

use super::ensure;
use crate::core::{Deployment, GasReporter, Scenario};
use crate::utils::Result;

/// createPair yields a pair that getPair finds in either token order
pub struct CreatePair;

#[async_trait]
impl Scenario for CreatePair {
    fn name(&self) -> &'static str {
        "create-pair"
    }

    async fn run(&self, deployment: &Deployment, gas: &GasReporter) -> Result<()> {
        let token_a = deployment.token_a.address();
        let token_b = deployment.token_b.address();

        let pending = deployment
            .factory
            .send("createPair", (token_a, token_b))
            .await?;
        gas.report(pending, "createPair").await?;

        let pair: Address = deployment.factory.call("getPair", (token_a, token_b)).await?;
        ensure(!pair.is_zero(), || "getPair returned the zero address".to_string())?;

        let reversed: Address = deployment.factory.call("getPair", (token_b, token_a)).await?;
        ensure(reversed == pair, || {
            format!(
                "getPair is not symmetric: {:?} vs {:?}",
                pair, reversed
            )
        })?;

        tracing::info!("🔗 Pair created at {:?}", pair);

        Ok(())
    }
}
