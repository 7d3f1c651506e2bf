use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, TxHash, U256, U64};

use crate::utils::{HarnessError, Result};

/// Number and timestamp of a mined block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub number: u64,
    pub timestamp: u64,
}

/// Core abstraction: a chain the harness can deploy to and query
#[async_trait]
pub trait Chain: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> String;

    /// Accounts this chain can authorize transactions for
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Submit a transaction; `to == None` deploys `data` as creation code
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;

    /// Suspend until the transaction has a receipt
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt>;

    /// Read-only call against the latest state
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    async fn latest_block(&self) -> Result<BlockInfo>;

    /// Why a mined transaction reverted, when the backend knows
    async fn revert_reason(&self, _hash: TxHash) -> Option<String> {
        None
    }
}

/// A submitted transaction that has not been confirmed yet
pub struct PendingTx {
    chain: Arc<dyn Chain>,
    hash: TxHash,
    gas_price: Option<U256>,
}

impl PendingTx {
    pub fn new(chain: Arc<dyn Chain>, hash: TxHash, gas_price: Option<U256>) -> Self {
        Self {
            chain,
            hash,
            gas_price,
        }
    }

    /// Submit `tx` and wrap the resulting hash
    pub async fn submit(chain: Arc<dyn Chain>, tx: TransactionRequest) -> Result<Self> {
        let gas_price = tx.gas_price;
        let hash = chain.send_transaction(tx).await?;
        tracing::debug!("Submitted {:?}", hash);
        Ok(Self::new(chain, hash, gas_price))
    }

    pub fn tx_hash(&self) -> TxHash {
        self.hash
    }

    /// Price the transaction was submitted with, if it set one
    pub fn gas_price(&self) -> Option<U256> {
        self.gas_price
    }

    /// Wait for the receipt; a status-0 receipt becomes [`HarnessError::Reverted`]
    pub async fn confirm(self) -> Result<TransactionReceipt> {
        let receipt = self.chain.wait_for_receipt(self.hash).await?;

        if receipt.status == Some(U64::zero()) {
            let reason = self
                .chain
                .revert_reason(self.hash)
                .await
                .unwrap_or_else(|| "execution reverted".to_string());
            return Err(HarnessError::Reverted {
                hash: self.hash,
                reason,
            });
        }

        Ok(receipt)
    }
}

impl std::fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTx")
            .field("chain", &self.chain.name())
            .field("hash", &self.hash)
            .field("gas_price", &self.gas_price)
            .finish()
    }
}
