use ethers::types::TxHash;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Invalid artifact {name}: {reason}")]
    InvalidArtifact { name: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(#[from] ethers::providers::ProviderError),

    #[error("ABI error: {0}")]
    Abi(#[from] ethers::contract::AbiError),

    #[error("ABI encoding error: {0}")]
    AbiEncoding(#[from] ethers::abi::Error),

    #[error("Wallet error: {0}")]
    Wallet(#[from] ethers::signers::WalletError),

    #[error("Simulation failed: {0}")]
    Simulation(String),

    #[error("No signer available for account {0:?}")]
    UnknownAccount(ethers::types::Address),

    #[error("Deployment of {contract} failed: {reason}")]
    Deployment { contract: String, reason: String },

    #[error("Transaction {hash:?} reverted: {reason}")]
    Reverted { hash: TxHash, reason: String },

    #[error("Call reverted: {0}")]
    CallReverted(String),

    #[error("No receipt for transaction {0:?} (dropped from the pool?)")]
    MissingReceipt(TxHash),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
