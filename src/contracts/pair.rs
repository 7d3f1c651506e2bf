//! UniswapV2Pair interface
//! Used to read pool reserves when no compiled pair artifact is available
use ethers::abi::parse_abi;
use ethers::contract::BaseContract;
use ethers::types::U256;

use crate::utils::{HarnessError, Result};

const PAIR_ABI: &[&str] = &[
    "function token0() external view returns (address)",
    "function token1() external view returns (address)",
    "function factory() external view returns (address)",
    "function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)",
    "function totalSupply() external view returns (uint256)",
    "function balanceOf(address owner) external view returns (uint256)",
    "function price0CumulativeLast() external view returns (uint256)",
    "function price1CumulativeLast() external view returns (uint256)",
    "function kLast() external view returns (uint256)",
    "event Sync(uint112 reserve0, uint112 reserve1)",
    "event Mint(address indexed sender, uint amount0, uint amount1)",
];

/// Built-in pair interface
pub fn pair_interface() -> Result<BaseContract> {
    let abi = parse_abi(PAIR_ABI)
        .map_err(|e| HarnessError::Artifact(format!("Invalid pair ABI: {}", e)))?;
    Ok(BaseContract::from(abi))
}

/// Decoded `getReserves()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u32,
}

impl From<(U256, U256, u32)> for Reserves {
    fn from((reserve0, reserve1, block_timestamp_last): (U256, U256, u32)) -> Self {
        Self {
            reserve0,
            reserve1,
            block_timestamp_last,
        }
    }
}

impl Reserves {
    pub fn both_positive(&self) -> bool {
        !self.reserve0.is_zero() && !self.reserve1.is_zero()
    }
}
