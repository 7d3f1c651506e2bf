//! A scripted chain that understands just enough of the Uniswap V2 surface
//! to drive the deployment sequence and the scenario suite without an EVM.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use ethers::abi::{self, ParamType, Token};
use ethers::types::{
    Address, Bytes, NameOrAddress, TransactionReceipt, TransactionRequest, TxHash, H256, U256, U64,
};
use ethers::utils::{get_contract_address, id, keccak256};
use tokio::sync::Mutex;
use uniswap_v2_harness::blockchain::{BlockInfo, Chain};
use uniswap_v2_harness::{ArtifactSet, HarnessError, Result};

pub const GAS_PRICE: u64 = 1_000_000_000;

const ADD_LIQUIDITY: &str =
    "addLiquidity(address,address,uint256,uint256,uint256,uint256,address,uint256)";

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture_artifacts() -> ArtifactSet {
    ArtifactSet::load_dir(fixtures_dir()).expect("fixture artifacts")
}

#[derive(Debug, Clone, PartialEq)]
pub enum FakeContract {
    Weth,
    Factory { fee_to_setter: Address },
    Router { factory: Address, weth: Address },
    Token { name: String, symbol: String },
    Pair,
}

/// An `approve` the chain accepted
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub token: Address,
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

/// Decoded `addLiquidity` arguments, plus the chain time when it was sent
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityCall {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
    pub latest_timestamp: u64,
}

#[derive(Default)]
struct FakeState {
    nonces: HashMap<Address, u64>,
    block: u64,
    timestamp: u64,
    tx_count: u64,
    deployed: Vec<(Address, FakeContract)>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    revert_reasons: HashMap<TxHash, String>,
    pairs: HashMap<(Address, Address), Address>,
    reserves: HashMap<Address, (U256, U256)>,
    allowances: HashMap<(Address, Address, Address), U256>,
    approvals: Vec<Approval>,
    liquidity_calls: Vec<LiquidityCall>,
}

impl FakeState {
    fn contract(&self, address: Address) -> Option<&FakeContract> {
        self.deployed
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, c)| c)
    }
}

/// Outcome of one scripted transaction
enum Execution {
    Created(Address),
    Done,
    Reverted(String),
}

pub struct FakeUniswapChain {
    accounts: Vec<Address>,
    /// Answer `feeToSetter()` with this instead of the constructor argument
    fee_to_setter_override: Option<Address>,
    /// Report `gas_used = 0` for addLiquidity
    free_liquidity: bool,
    state: Mutex<FakeState>,
}

impl FakeUniswapChain {
    pub fn new() -> Self {
        Self {
            accounts: vec![Address::repeat_byte(0xaa), Address::repeat_byte(0xbb)],
            fee_to_setter_override: None,
            free_liquidity: false,
            state: Mutex::new(FakeState {
                timestamp: 1_700_000_000,
                ..Default::default()
            }),
        }
    }

    pub fn with_wrong_fee_to_setter(mut self) -> Self {
        self.fee_to_setter_override = Some(Address::repeat_byte(0x66));
        self
    }

    pub fn with_free_liquidity(mut self) -> Self {
        self.free_liquidity = true;
        self
    }

    pub fn owner(&self) -> Address {
        self.accounts[0]
    }

    /// Every contract created so far, in creation order
    pub async fn deployed(&self) -> Vec<(Address, FakeContract)> {
        self.state.lock().await.deployed.clone()
    }

    pub async fn reserves(&self, pair: Address) -> Option<(U256, U256)> {
        self.state.lock().await.reserves.get(&pair).copied()
    }

    pub async fn approvals(&self) -> Vec<Approval> {
        self.state.lock().await.approvals.clone()
    }

    pub async fn liquidity_calls(&self) -> Vec<LiquidityCall> {
        self.state.lock().await.liquidity_calls.clone()
    }

    fn execute(&self, state: &mut FakeState, from: Address, to: Option<Address>, data: &[u8]) -> Execution {
        match to {
            None => self.create(state, from, data),
            Some(target) => match state.contract(target).cloned() {
                Some(contract) => self.invoke(state, from, target, contract, data),
                None => Execution::Reverted("call to non-contract".to_string()),
            },
        }
    }

    fn create(&self, state: &mut FakeState, from: Address, data: &[u8]) -> Execution {
        let nonce = state.nonces.get(&from).copied().unwrap_or_default();
        let address = get_contract_address(from, nonce);

        let (kind, args) = match data.split_first() {
            Some((kind, args)) => (*kind, args),
            None => return Execution::Reverted("empty init code".to_string()),
        };

        let contract = match kind {
            0x01 => match abi::decode(&[ParamType::Address], args).as_deref() {
                Ok([Token::Address(fee_to_setter)]) => FakeContract::Factory {
                    fee_to_setter: *fee_to_setter,
                },
                _ => return Execution::Reverted("bad factory constructor".to_string()),
            },
            0x02 => match abi::decode(&[ParamType::Address, ParamType::Address], args).as_deref() {
                Ok([Token::Address(factory), Token::Address(weth)]) => FakeContract::Router {
                    factory: *factory,
                    weth: *weth,
                },
                _ => return Execution::Reverted("bad router constructor".to_string()),
            },
            0x03 => FakeContract::Weth,
            0x04 => match abi::decode(&[ParamType::String, ParamType::String], args).as_deref() {
                Ok([Token::String(name), Token::String(symbol)]) => FakeContract::Token {
                    name: name.clone(),
                    symbol: symbol.clone(),
                },
                _ => return Execution::Reverted("bad token constructor".to_string()),
            },
            _ => return Execution::Reverted("unknown init code".to_string()),
        };

        state.deployed.push((address, contract));
        Execution::Created(address)
    }

    fn invoke(
        &self,
        state: &mut FakeState,
        from: Address,
        target: Address,
        contract: FakeContract,
        data: &[u8],
    ) -> Execution {
        if data.len() < 4 {
            return Execution::Reverted("no selector".to_string());
        }
        let (selector, args) = data.split_at(4);

        match contract {
            FakeContract::Factory { .. } if selector == id("createPair(address,address)") => {
                let (a, b) = match decode_addresses(args) {
                    Some(pair) => pair,
                    None => return Execution::Reverted("bad createPair args".to_string()),
                };
                if a == b {
                    return Execution::Reverted("UniswapV2: IDENTICAL_ADDRESSES".to_string());
                }
                if state.pairs.contains_key(&sorted(a, b)) {
                    return Execution::Reverted("UniswapV2: PAIR_EXISTS".to_string());
                }
                create_pair(state, a, b);
                Execution::Done
            }
            FakeContract::Token { .. } if selector == id("approve(address,uint256)") => {
                match abi::decode(&[ParamType::Address, ParamType::Uint(256)], args).as_deref() {
                    Ok([Token::Address(spender), Token::Uint(amount)]) => {
                        state.allowances.insert((target, from, *spender), *amount);
                        state.approvals.push(Approval {
                            token: target,
                            owner: from,
                            spender: *spender,
                            amount: *amount,
                        });
                        Execution::Done
                    }
                    _ => Execution::Reverted("bad approve args".to_string()),
                }
            }
            FakeContract::Router { .. } if selector == id(ADD_LIQUIDITY) => {
                let params = [
                    ParamType::Address,
                    ParamType::Address,
                    ParamType::Uint(256),
                    ParamType::Uint(256),
                    ParamType::Uint(256),
                    ParamType::Uint(256),
                    ParamType::Address,
                    ParamType::Uint(256),
                ];
                let tokens = match abi::decode(&params, args) {
                    Ok(tokens) => tokens,
                    Err(_) => return Execution::Reverted("bad addLiquidity args".to_string()),
                };
                let call = match tokens.as_slice() {
                    [Token::Address(token_a), Token::Address(token_b), Token::Uint(amount_a_desired), Token::Uint(amount_b_desired), Token::Uint(amount_a_min), Token::Uint(amount_b_min), Token::Address(to), Token::Uint(deadline)] => {
                        LiquidityCall {
                            token_a: *token_a,
                            token_b: *token_b,
                            amount_a_desired: *amount_a_desired,
                            amount_b_desired: *amount_b_desired,
                            amount_a_min: *amount_a_min,
                            amount_b_min: *amount_b_min,
                            to: *to,
                            deadline: *deadline,
                            latest_timestamp: state.timestamp,
                        }
                    }
                    _ => return Execution::Reverted("bad addLiquidity args".to_string()),
                };
                let (token_a, token_b, amount_a, amount_b, deadline) = (
                    call.token_a,
                    call.token_b,
                    call.amount_a_desired,
                    call.amount_b_desired,
                    call.deadline,
                );
                state.liquidity_calls.push(call);

                if deadline < U256::from(state.timestamp + 1) {
                    return Execution::Reverted("UniswapV2Router: EXPIRED".to_string());
                }
                for (token, amount) in [(token_a, amount_a), (token_b, amount_b)] {
                    let allowance = state
                        .allowances
                        .get(&(token, from, target))
                        .copied()
                        .unwrap_or_default();
                    if allowance < amount {
                        return Execution::Reverted("TransferHelper: TRANSFER_FROM_FAILED".to_string());
                    }
                }

                let key = sorted(token_a, token_b);
                let existing = state.pairs.get(&key).copied();
                let pair = match existing {
                    Some(pair) => pair,
                    None => create_pair(state, token_a, token_b),
                };
                let (amount0, amount1) = if key.0 == token_a {
                    (amount_a, amount_b)
                } else {
                    (amount_b, amount_a)
                };
                let reserves = state.reserves.entry(pair).or_default();
                reserves.0 += amount0;
                reserves.1 += amount1;
                Execution::Done
            }
            _ => Execution::Reverted("function selector was not recognized".to_string()),
        }
    }

    fn read(&self, state: &FakeState, to: Address, data: &[u8]) -> Result<Bytes> {
        let contract = state
            .contract(to)
            .ok_or_else(|| HarnessError::CallReverted("call to non-contract".to_string()))?;
        if data.len() < 4 {
            return Err(HarnessError::CallReverted("no selector".to_string()));
        }
        let (selector, args) = data.split_at(4);

        let output = match contract {
            FakeContract::Factory { fee_to_setter } if selector == id("feeToSetter()") => {
                vec![Token::Address(self.fee_to_setter_override.unwrap_or(*fee_to_setter))]
            }
            FakeContract::Factory { .. } if selector == id("getPair(address,address)") => {
                let (a, b) = decode_addresses(args)
                    .ok_or_else(|| HarnessError::CallReverted("bad getPair args".to_string()))?;
                let pair = state.pairs.get(&sorted(a, b)).copied().unwrap_or_default();
                vec![Token::Address(pair)]
            }
            FakeContract::Router { factory, .. } if selector == id("factory()") => {
                vec![Token::Address(*factory)]
            }
            FakeContract::Router { weth, .. } if selector == id("WETH()") => {
                vec![Token::Address(*weth)]
            }
            FakeContract::Pair if selector == id("getReserves()") => {
                let (r0, r1) = state.reserves.get(&to).copied().unwrap_or_default();
                vec![
                    Token::Uint(r0),
                    Token::Uint(r1),
                    Token::Uint(U256::from(state.timestamp as u32)),
                ]
            }
            _ => {
                return Err(HarnessError::CallReverted(
                    "function selector was not recognized".to_string(),
                ))
            }
        };

        Ok(Bytes::from(abi::encode(&output)))
    }
}

#[async_trait]
impl Chain for FakeUniswapChain {
    fn name(&self) -> String {
        "fake uniswap chain".to_string()
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let from = tx.from.unwrap_or_default();
        if !self.accounts.contains(&from) {
            return Err(HarnessError::UnknownAccount(from));
        }
        let to = match tx.to {
            Some(NameOrAddress::Address(address)) => Some(address),
            Some(NameOrAddress::Name(_)) => {
                return Err(HarnessError::Simulation("ENS not supported".to_string()))
            }
            None => None,
        };
        let data = tx.data.unwrap_or_default();
        let gas_used = if self.free_liquidity && data.starts_with(&id(ADD_LIQUIDITY)) {
            U256::zero()
        } else {
            U256::from(100_000u64)
        };

        let mut state = self.state.lock().await;
        let execution = self.execute(&mut state, from, to, &data);

        *state.nonces.entry(from).or_default() += 1;
        state.tx_count += 1;
        state.block += 1;
        state.timestamp += 1;

        let hash = H256::from(keccak256(state.tx_count.to_be_bytes()));
        let mut receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(state.block)),
            from,
            to,
            gas_used: Some(gas_used),
            cumulative_gas_used: gas_used,
            effective_gas_price: Some(U256::from(GAS_PRICE)),
            status: Some(U64::one()),
            ..Default::default()
        };

        match execution {
            Execution::Created(address) => receipt.contract_address = Some(address),
            Execution::Done => {}
            Execution::Reverted(reason) => {
                receipt.status = Some(U64::zero());
                state.revert_reasons.insert(hash, reason);
            }
        }

        state.receipts.insert(hash, receipt);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt> {
        self.state
            .lock()
            .await
            .receipts
            .get(&hash)
            .cloned()
            .ok_or(HarnessError::MissingReceipt(hash))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let to = match tx.to {
            Some(NameOrAddress::Address(address)) => address,
            _ => return Err(HarnessError::CallReverted("no target".to_string())),
        };
        let data = tx.data.unwrap_or_default();
        let state = self.state.lock().await;
        self.read(&state, to, &data)
    }

    async fn latest_block(&self) -> Result<BlockInfo> {
        let state = self.state.lock().await;
        Ok(BlockInfo {
            number: state.block,
            timestamp: state.timestamp,
        })
    }

    async fn revert_reason(&self, hash: TxHash) -> Option<String> {
        self.state.lock().await.revert_reasons.get(&hash).cloned()
    }
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn decode_addresses(args: &[u8]) -> Option<(Address, Address)> {
    match abi::decode(&[ParamType::Address, ParamType::Address], args).ok()?.as_slice() {
        [Token::Address(a), Token::Address(b)] => Some((*a, *b)),
        _ => None,
    }
}

fn create_pair(state: &mut FakeState, a: Address, b: Address) -> Address {
    let key = sorted(a, b);
    let mut seed = key.0.as_bytes().to_vec();
    seed.extend_from_slice(key.1.as_bytes());
    let pair = Address::from_slice(&keccak256(seed)[12..]);

    state.pairs.insert(key, pair);
    state.reserves.insert(pair, (U256::zero(), U256::zero()));
    state.deployed.push((pair, FakeContract::Pair));
    pair
}
