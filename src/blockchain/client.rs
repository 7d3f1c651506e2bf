use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::utils::{Anvil, AnvilInstance};

use super::chain::{BlockInfo, Chain};
use crate::utils::{HarnessError, Result};

/// JSON-RPC chain client for dev nodes with unlocked accounts
pub struct RpcChain {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
    endpoint: String,
    // Keeps a spawned node alive for as long as the client
    _anvil: Option<AnvilInstance>,
}

impl RpcChain {
    /// Connect to an existing node
    pub async fn new(rpc_url: &str) -> Result<Self> {
        Self::connect(rpc_url, None).await
    }

    /// Start a local Anvil node and connect to it
    pub async fn spawn_anvil() -> Result<Self> {
        let available = Command::new("anvil")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);

        if !available {
            return Err(HarnessError::Config(
                "--spawn-anvil needs the `anvil` binary on PATH".to_string(),
            ));
        }

        let anvil = Anvil::new().spawn();
        let endpoint = anvil.endpoint();
        tracing::info!("Spawned anvil at {}", endpoint);

        Self::connect(&endpoint, Some(anvil)).await
    }

    async fn connect(rpc_url: &str, anvil: Option<AnvilInstance>) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| {
                HarnessError::Rpc(ProviderError::CustomError(format!("Invalid RPC URL: {}", e)))
            })?
            .interval(Duration::from_millis(10));

        let provider = Arc::new(provider);

        let chain_id = provider.get_chainid().await?;

        tracing::info!("Connected to chain ID: {}", chain_id);

        Ok(Self {
            provider,
            chain_id: chain_id.as_u64(),
            endpoint: rpc_url.to_string(),
            _anvil: anvil,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn chain_name(&self) -> &'static str {
        chain_name(self.chain_id)
    }
}

#[async_trait]
impl Chain for RpcChain {
    fn name(&self) -> String {
        format!("{} ({}) at {}", self.chain_name(), self.chain_id, self.endpoint)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self.provider.send_transaction(tx, None).await?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt> {
        tracing::debug!("Waiting for receipt of {:?}", hash);

        PendingTransaction::new(hash, &*self.provider)
            .confirmations(1)
            .await?
            .ok_or(HarnessError::MissingReceipt(hash))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let typed: TypedTransaction = tx.into();
        self.provider.call(&typed, None).await.map_err(|e| {
            match RpcError::as_error_response(&e) {
                Some(response) => HarnessError::CallReverted(response.message.clone()),
                None => HarnessError::Rpc(e),
            }
        })
    }

    async fn latest_block(&self) -> Result<BlockInfo> {
        let block = self
            .provider
            .get_block(BlockNumber::Latest)
            .await?
            .ok_or_else(|| {
                HarnessError::Rpc(ProviderError::CustomError(
                    "Node returned no latest block".to_string(),
                ))
            })?;

        Ok(BlockInfo {
            number: block.number.map(|n| n.as_u64()).unwrap_or_default(),
            timestamp: block.timestamp.as_u64(),
        })
    }
}

/// Display name for the chain ids a harness run is likely to meet
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "Ethereum Mainnet",
        1337 => "Ganache/Geth dev chain",
        31337 => "Hardhat/Anvil dev chain",
        11155111 => "Sepolia",
        _ => "Unknown Chain",
    }
}
