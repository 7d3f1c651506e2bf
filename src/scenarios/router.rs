use async_trait::async_trait;
use ethers::types::Address;

use super::ensure;
use crate::core::{Deployment, GasReporter, Scenario};
use crate::utils::Result;

/// The router points at the deployed factory and WETH
pub struct RouterWiring;

#[async_trait]
impl Scenario for RouterWiring {
    fn name(&self) -> &'static str {
        "router-wiring"
    }

    async fn run(&self, deployment: &Deployment, _gas: &GasReporter) -> Result<()> {
        let factory: Address = deployment.router.call("factory", ()).await?;
        let weth: Address = deployment.router.call("WETH", ()).await?;

        ensure(factory == deployment.factory.address(), || {
            format!(
                "router.factory() is {:?}, expected {:?}",
                factory,
                deployment.factory.address()
            )
        })?;

        ensure(weth == deployment.weth.address(), || {
            format!(
                "router.WETH() is {:?}, expected {:?}",
                weth,
                deployment.weth.address()
            )
        })
    }
}
