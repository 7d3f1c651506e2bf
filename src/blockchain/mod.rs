pub mod accounts;
pub mod chain;
pub mod client;
pub mod simulator;

pub use chain::{BlockInfo, Chain, PendingTx};
pub use client::RpcChain;
pub use simulator::SimulatedChain;

use std::sync::Arc;

use crate::config::ChainTarget;
use crate::utils::Result;

/// Open the chain a run targets
pub async fn connect(target: &ChainTarget) -> Result<Arc<dyn Chain>> {
    let chain: Arc<dyn Chain> = match target {
        ChainTarget::Simulated(config) => Arc::new(SimulatedChain::new(config.clone())?),
        ChainTarget::Rpc(url) => Arc::new(RpcChain::new(url).await?),
        ChainTarget::SpawnAnvil => Arc::new(RpcChain::spawn_anvil().await?),
    };

    tracing::info!("Using {}", chain.name());

    Ok(chain)
}
