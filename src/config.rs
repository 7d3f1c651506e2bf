//! Runtime settings for a harness run
use std::path::PathBuf;

use ethers::types::U256;

/// Mnemonic every local dev node (Hardhat, Anvil) seeds its accounts from
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Constants of the in-process chain
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub chain_id: u64,
    pub block_gas_limit: u64,
    /// Price used when a transaction does not set one, in wei
    pub gas_price: U256,
    /// Starting balance of every dev account, in wei
    pub initial_balance: U256,
    pub accounts: u32,
    pub mnemonic: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            block_gas_limit: 30_000_000,
            gas_price: U256::from(1_000_000_000u64), // 1 gwei
            initial_balance: U256::from(10_000u64) * U256::exp10(18), // 10k ETH
            accounts: 20,
            mnemonic: DEV_MNEMONIC.to_string(),
        }
    }
}

/// Which chain the harness deploys to
#[derive(Debug, Clone)]
pub enum ChainTarget {
    /// In-process revm chain
    Simulated(SimulatorConfig),
    /// Existing JSON-RPC dev node with unlocked accounts
    Rpc(String),
    /// Anvil started (and stopped) by the harness
    SpawnAnvil,
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub artifacts_dir: PathBuf,
    pub target: ChainTarget,
    /// Run only these scenarios (empty = all)
    pub only: Vec<String>,
}

impl HarnessConfig {
    pub fn new(artifacts_dir: impl Into<PathBuf>, target: ChainTarget) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            target,
            only: Vec::new(),
        }
    }

    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }
}
