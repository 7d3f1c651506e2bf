use async_trait::async_trait;
use ethers::types::Address;

use super::ensure;
use crate::core::{Deployment, GasReporter, Scenario};
use crate::utils::Result;

/// A fresh factory hands fee control to its deployer
pub struct FactoryFeeToSetter;

#[async_trait]
impl Scenario for FactoryFeeToSetter {
    fn name(&self) -> &'static str {
        "factory-fee-to-setter"
    }

    async fn run(&self, deployment: &Deployment, _gas: &GasReporter) -> Result<()> {
        let fee_to_setter: Address = deployment.factory.call("feeToSetter", ()).await?;

        tracing::debug!("feeToSetter = {:?}", fee_to_setter);

        ensure(fee_to_setter == deployment.owner, || {
            format!(
                "feeToSetter is {:?}, expected owner {:?}",
                fee_to_setter, deployment.owner
            )
        })
    }
}
