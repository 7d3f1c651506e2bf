//! Uniswap V2 contract interfaces and handles
//!
//! Compiled artifacts are looked up by the names in [`names`]. Deployed
//! contracts are wrapped in a [`ContractHandle`] that encodes calls with the
//! artifact's ABI and sends them through a [`Chain`](crate::blockchain::Chain).
pub mod handle;
pub mod pair;

pub use handle::ContractHandle;
pub use pair::{pair_interface, Reserves};

/// Artifact (contract) names, one JSON file per name
pub mod names {
    pub const WETH: &str = "WETH";
    pub const FACTORY: &str = "UniswapV2Factory";
    pub const ROUTER: &str = "UniswapV2Router02";
    pub const PAIR: &str = "IUniswapV2Pair";
    pub const TEST_TOKEN: &str = "TestToken";

    /// Every artifact a deployment needs
    pub fn required() -> [&'static str; 4] {
        [WETH, FACTORY, ROUTER, TEST_TOKEN]
    }
}
