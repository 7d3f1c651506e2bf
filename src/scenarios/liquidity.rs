use async_trait::async_trait;
use ethers::types::{Address, U256};

use super::ensure;
use crate::contracts::Reserves;
use crate::core::{ether, Deployment, GasReporter, Scenario};
use crate::utils::Result;

const APPROVAL: u64 = 1000;
const DEPOSIT: u64 = 100;
/// Seconds past the latest block before the router rejects the call
const DEADLINE_WINDOW: u64 = 20 * 60;

/// Seeding a pair through the router leaves both reserves non-zero
pub struct AddLiquidity;

#[async_trait]
impl Scenario for AddLiquidity {
    fn name(&self) -> &'static str {
        "add-liquidity"
    }

    async fn run(&self, deployment: &Deployment, gas: &GasReporter) -> Result<()> {
        let router = deployment.router.address();
        let token_a = deployment.token_a.address();
        let token_b = deployment.token_b.address();

        for token in [&deployment.token_a, &deployment.token_b] {
            token
                .send("approve", (router, ether(APPROVAL)))
                .await?
                .confirm()
                .await?;
        }

        let deadline = deployment.chain().latest_block().await?.timestamp + DEADLINE_WINDOW;

        let pending = deployment
            .router
            .send(
                "addLiquidity",
                (
                    token_a,
                    token_b,
                    ether(DEPOSIT),
                    ether(DEPOSIT),
                    U256::zero(),
                    U256::zero(),
                    deployment.owner,
                    U256::from(deadline),
                ),
            )
            .await?;
        let receipt = gas.report(pending, "addLiquidity").await?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        ensure(!gas_used.is_zero(), || "addLiquidity used no gas".to_string())?;

        let pair: Address = deployment.factory.call("getPair", (token_a, token_b)).await?;
        ensure(!pair.is_zero(), || "no pair after addLiquidity".to_string())?;

        let reserves: Reserves = deployment
            .pair_at(pair)
            .call::<(U256, U256, u32), _>("getReserves", ())
            .await?
            .into();

        tracing::info!(
            "💧 Reserves: {} / {}",
            reserves.reserve0,
            reserves.reserve1
        );

        ensure(reserves.both_positive(), || {
            format!(
                "expected both reserves > 0, got {} and {}",
                reserves.reserve0, reserves.reserve1
            )
        })
    }
}
