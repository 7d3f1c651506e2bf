//! In-process chain backed by revm
//!
//! Every transaction is signed by the matching dev wallet, executed against an
//! [`InMemoryDB`] and mined into its own block. Receipts are kept in memory so
//! the rest of the harness can treat this chain exactly like a JSON-RPC node.
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use ethers::abi::{self, ParamType, Token};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::utils::keccak256;
use revm::{
    db::InMemoryDB,
    primitives::{
        AccountInfo, Address as RevmAddress, Bytes as RevmBytes, ExecutionResult, Log as RevmLog,
        Output, SpecId, TransactTo, U256 as RevmU256, KECCAK_EMPTY,
    },
    Database, Evm,
};
use tokio::sync::Mutex;

use super::accounts::dev_wallets;
use super::chain::{BlockInfo, Chain};
use crate::config::SimulatorConfig;
use crate::utils::{HarnessError, Result};

const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0]; // Error(string)
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71]; // Panic(uint256)

/// Mutable chain state, guarded by one lock so transactions never interleave
struct ChainState {
    db: InMemoryDB,
    block_number: u64,
    timestamp: u64,
    receipts: HashMap<TxHash, TransactionReceipt>,
    revert_reasons: HashMap<TxHash, String>,
}

/// Local blockchain simulator
pub struct SimulatedChain {
    config: SimulatorConfig,
    wallets: HashMap<Address, LocalWallet>,
    accounts: Vec<Address>,
    state: Mutex<ChainState>,
}

impl SimulatedChain {
    /// Create a chain with funded dev accounts and a genesis block at wall-clock time
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        let wallets = dev_wallets(&config.mnemonic, config.accounts, config.chain_id)?;

        let mut db = InMemoryDB::default();
        let mut accounts = Vec::with_capacity(wallets.len());
        let mut by_address = HashMap::with_capacity(wallets.len());

        for wallet in wallets {
            let address = wallet.address();
            db.insert_account_info(
                to_revm_address(address),
                AccountInfo {
                    balance: to_revm_u256(config.initial_balance),
                    nonce: 0,
                    code_hash: KECCAK_EMPTY,
                    code: None,
                },
            );
            accounts.push(address);
            by_address.insert(address, wallet);
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        tracing::info!(
            "Simulated chain {} with {} funded accounts",
            config.chain_id,
            accounts.len()
        );

        Ok(Self {
            config,
            wallets: by_address,
            accounts,
            state: Mutex::new(ChainState {
                db,
                block_number: 0,
                timestamp,
                receipts: HashMap::new(),
                revert_reasons: HashMap::new(),
            }),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Balance of `address` at the latest block
    pub async fn balance(&self, address: Address) -> Result<U256> {
        let mut state = self.state.lock().await;
        let info = state
            .db
            .basic(to_revm_address(address))
            .map_err(|e| HarnessError::Simulation(format!("State read failed: {:?}", e)))?;
        Ok(info.map(|i| from_revm_u256(i.balance)).unwrap_or_default())
    }

    /// Sign, execute and mine one transaction
    fn execute(&self, state: &mut ChainState, tx: TransactionRequest) -> Result<TxHash> {
        let from = tx.from.ok_or_else(|| {
            HarnessError::Simulation("Transaction has no sender".to_string())
        })?;
        let wallet = self
            .wallets
            .get(&from)
            .ok_or(HarnessError::UnknownAccount(from))?;

        let to = match &tx.to {
            Some(NameOrAddress::Address(address)) => Some(*address),
            Some(NameOrAddress::Name(name)) => {
                return Err(HarnessError::Simulation(format!(
                    "ENS names are not supported: {}",
                    name
                )))
            }
            None => None,
        };

        let nonce = state
            .db
            .basic(to_revm_address(from))
            .map_err(|e| HarnessError::Simulation(format!("State read failed: {:?}", e)))?
            .map(|info| info.nonce)
            .unwrap_or_default();

        let gas_limit = match tx.gas {
            Some(gas) if gas > U256::from(u64::MAX) => {
                return Err(HarnessError::Simulation(format!(
                    "Gas limit {} does not fit in 64 bits",
                    gas
                )))
            }
            Some(gas) => gas.as_u64(),
            None => self.config.block_gas_limit,
        };
        let gas_price = tx.gas_price.unwrap_or(self.config.gas_price);
        let value = tx.value.unwrap_or_default();
        let data = tx.data.clone().unwrap_or_default();

        let signed: TypedTransaction = tx
            .nonce(nonce)
            .gas(gas_limit)
            .gas_price(gas_price)
            .chain_id(self.config.chain_id)
            .into();
        let signature = wallet.sign_transaction_sync(&signed)?;
        let hash = signed.hash(&signature);

        let block_number = state.block_number + 1;
        let timestamp = state.timestamp + 1;
        let chain_id = self.config.chain_id;
        let block_gas_limit = self.config.block_gas_limit;

        let result = {
            let mut evm = Evm::builder()
                .with_db(&mut state.db)
                .modify_cfg_env(|cfg| cfg.chain_id = chain_id)
                .modify_block_env(|block| {
                    block.number = RevmU256::from(block_number);
                    block.timestamp = RevmU256::from(timestamp);
                    block.gas_limit = RevmU256::from(block_gas_limit);
                    block.basefee = RevmU256::ZERO;
                })
                .modify_tx_env(|env| {
                    env.caller = to_revm_address(from);
                    env.gas_limit = gas_limit;
                    env.gas_price = to_revm_u256(gas_price);
                    env.transact_to = match to {
                        Some(address) => TransactTo::Call(to_revm_address(address)),
                        None => TransactTo::create(),
                    };
                    env.value = to_revm_u256(value);
                    env.data = RevmBytes::from(data.to_vec());
                    env.nonce = Some(nonce);
                    env.chain_id = Some(chain_id);
                })
                .with_spec_id(SpecId::CANCUN)
                .build();

            evm.transact_commit()
                .map_err(|e| HarnessError::Simulation(format!("REVM exec failed: {:?}", e)))?
        };

        // Only executed transactions produce a block
        state.block_number = block_number;
        state.timestamp = timestamp;

        let block_hash = H256::from(keccak256(block_number.to_be_bytes()));
        let mut receipt = TransactionReceipt {
            transaction_hash: hash,
            transaction_index: U64::zero(),
            block_hash: Some(block_hash),
            block_number: Some(U64::from(block_number)),
            from,
            to,
            effective_gas_price: Some(gas_price),
            ..Default::default()
        };

        match result {
            ExecutionResult::Success {
                gas_used,
                output,
                logs,
                ..
            } => {
                if let Output::Create(_, Some(created)) = output {
                    receipt.contract_address = Some(from_revm_address(created));
                }
                receipt.logs = logs
                    .iter()
                    .enumerate()
                    .map(|(index, log)| to_ethers_log(log, index, hash, block_hash, block_number))
                    .collect();
                receipt.gas_used = Some(U256::from(gas_used));
                receipt.status = Some(U64::one());
                tracing::debug!("✅ {:?} mined in block {} ({} gas)", hash, block_number, gas_used);
            }
            ExecutionResult::Revert { gas_used, output } => {
                let reason = parse_revert(&output);
                tracing::debug!("❌ {:?} reverted: {}", hash, reason);
                receipt.gas_used = Some(U256::from(gas_used));
                receipt.status = Some(U64::zero());
                state.revert_reasons.insert(hash, reason);
            }
            ExecutionResult::Halt { reason, gas_used } => {
                tracing::debug!("⛔ {:?} halted: {:?}", hash, reason);
                receipt.gas_used = Some(U256::from(gas_used));
                receipt.status = Some(U64::zero());
                state
                    .revert_reasons
                    .insert(hash, format!("Halted: {:?}", reason));
            }
        }

        receipt.cumulative_gas_used = receipt.gas_used.unwrap_or_default();
        state.receipts.insert(hash, receipt);

        Ok(hash)
    }

    /// Run a call against the latest state without committing it
    fn simulate_call(&self, state: &mut ChainState, tx: TransactionRequest) -> Result<Bytes> {
        let to = match tx.to {
            Some(NameOrAddress::Address(address)) => address,
            _ => {
                return Err(HarnessError::Simulation(
                    "Read-only call needs a target address".to_string(),
                ))
            }
        };
        let from = tx.from.unwrap_or_default();
        let data = tx.data.unwrap_or_default();
        let block_number = state.block_number;
        let timestamp = state.timestamp;
        let chain_id = self.config.chain_id;
        let block_gas_limit = self.config.block_gas_limit;

        let result = {
            let mut evm = Evm::builder()
                .with_db(&mut state.db)
                .modify_cfg_env(|cfg| cfg.chain_id = chain_id)
                .modify_block_env(|block| {
                    block.number = RevmU256::from(block_number);
                    block.timestamp = RevmU256::from(timestamp);
                    block.gas_limit = RevmU256::from(block_gas_limit);
                    block.basefee = RevmU256::ZERO;
                })
                .modify_tx_env(|env| {
                    env.caller = to_revm_address(from);
                    env.gas_limit = block_gas_limit;
                    env.gas_price = RevmU256::ZERO;
                    env.transact_to = TransactTo::Call(to_revm_address(to));
                    env.value = RevmU256::ZERO;
                    env.data = RevmBytes::from(data.to_vec());
                    env.nonce = None;
                })
                .with_spec_id(SpecId::CANCUN)
                .build();

            evm.transact()
                .map_err(|e| HarnessError::Simulation(format!("REVM call failed: {:?}", e)))?
                .result
        };

        match result {
            ExecutionResult::Success { output, .. } => {
                Ok(Bytes::from(output.into_data().to_vec()))
            }
            ExecutionResult::Revert { output, .. } => {
                Err(HarnessError::CallReverted(parse_revert(&output)))
            }
            ExecutionResult::Halt { reason, .. } => {
                Err(HarnessError::CallReverted(format!("Halted: {:?}", reason)))
            }
        }
    }
}

#[async_trait]
impl Chain for SimulatedChain {
    fn name(&self) -> String {
        format!("revm simulator (chain {})", self.config.chain_id)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let mut state = self.state.lock().await;
        self.execute(&mut state, tx)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt> {
        let state = self.state.lock().await;
        state
            .receipts
            .get(&hash)
            .cloned()
            .ok_or(HarnessError::MissingReceipt(hash))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let mut state = self.state.lock().await;
        self.simulate_call(&mut state, tx)
    }

    async fn latest_block(&self) -> Result<BlockInfo> {
        let state = self.state.lock().await;
        Ok(BlockInfo {
            number: state.block_number,
            timestamp: state.timestamp,
        })
    }

    async fn revert_reason(&self, hash: TxHash) -> Option<String> {
        let state = self.state.lock().await;
        state.revert_reasons.get(&hash).cloned()
    }
}

fn to_revm_address(addr: Address) -> RevmAddress {
    RevmAddress::from_slice(addr.as_bytes())
}

fn from_revm_address(addr: RevmAddress) -> Address {
    Address::from_slice(addr.as_slice())
}

fn to_revm_u256(value: U256) -> RevmU256 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    RevmU256::from_be_bytes(bytes)
}

fn from_revm_u256(value: RevmU256) -> U256 {
    U256::from_big_endian(&value.to_be_bytes::<32>())
}

fn to_ethers_log(
    log: &RevmLog,
    index: usize,
    hash: TxHash,
    block_hash: H256,
    block_number: u64,
) -> Log {
    Log {
        address: from_revm_address(log.address),
        topics: log
            .data
            .topics()
            .iter()
            .map(|topic| H256::from_slice(topic.as_slice()))
            .collect(),
        data: Bytes::from(log.data.data.to_vec()),
        block_hash: Some(block_hash),
        block_number: Some(U64::from(block_number)),
        transaction_hash: Some(hash),
        transaction_index: Some(U64::zero()),
        log_index: Some(U256::from(index)),
        removed: Some(false),
        ..Default::default()
    }
}

/// Decode `Error(string)` and `Panic(uint256)` revert payloads
fn parse_revert(output: &[u8]) -> String {
    if output.is_empty() {
        return "No reason".to_string();
    }

    if output.len() >= 4 && output[0..4] == ERROR_SELECTOR {
        if let Ok(tokens) = abi::decode(&[ParamType::String], &output[4..]) {
            if let Some(Token::String(msg)) = tokens.into_iter().next() {
                return msg;
            }
        }
    }

    if output.len() >= 4 && output[0..4] == PANIC_SELECTOR {
        if let Ok(tokens) = abi::decode(&[ParamType::Uint(256)], &output[4..]) {
            if let Some(Token::Uint(code)) = tokens.into_iter().next() {
                return format!("Panic(0x{:x})", code);
            }
        }
    }

    format!("0x{}", hex::encode(&output[..output.len().min(32)]))
}
