//! Dev accounts derived from a mnemonic, the way Hardhat and Anvil seed theirs
use ethers::signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer};

use crate::utils::Result;

/// Derive `count` wallets at `m/44'/60'/0'/0/{index}`
pub fn dev_wallets(mnemonic: &str, count: u32, chain_id: u64) -> Result<Vec<LocalWallet>> {
    (0..count)
        .map(|index| {
            let wallet = MnemonicBuilder::<English>::default()
                .phrase(mnemonic)
                .index(index)?
                .build()?;
            Ok(wallet.with_chain_id(chain_id))
        })
        .collect()
}
