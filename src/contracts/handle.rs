use std::sync::Arc;

use ethers::abi::{Detokenize, Tokenize};
use ethers::contract::BaseContract;
use ethers::types::{Address, TransactionRequest};

use crate::blockchain::{Chain, PendingTx};
use crate::utils::Result;

/// A deployed contract bound to a chain and a sending account
#[derive(Clone)]
pub struct ContractHandle {
    name: String,
    address: Address,
    interface: BaseContract,
    chain: Arc<dyn Chain>,
    sender: Address,
}

impl ContractHandle {
    /// Bind an address that the harness did not deploy itself
    pub fn at(
        name: impl Into<String>,
        address: Address,
        interface: BaseContract,
        chain: Arc<dyn Chain>,
        sender: Address,
    ) -> Self {
        Self {
            name: name.into(),
            address,
            interface,
            chain,
            sender,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain(&self) -> Arc<dyn Chain> {
        self.chain.clone()
    }

    /// Read-only call, decoded with this contract's ABI
    pub async fn call<D, T>(&self, method: &str, args: T) -> Result<D>
    where
        D: Detokenize + Send,
        T: Tokenize + Send,
    {
        let data = self.interface.encode(method, args)?;
        let tx = TransactionRequest::new()
            .from(self.sender)
            .to(self.address)
            .data(data);

        tracing::debug!("{}.{}() call", self.name, method);

        let output = self.chain.call(tx).await?;
        Ok(self.interface.decode_output(method, output)?)
    }

    /// Submit a state-changing transaction
    pub async fn send<T>(&self, method: &str, args: T) -> Result<PendingTx>
    where
        T: Tokenize + Send,
    {
        let data = self.interface.encode(method, args)?;
        let tx = TransactionRequest::new()
            .from(self.sender)
            .to(self.address)
            .data(data);

        tracing::debug!("{}.{}() send from {:?}", self.name, method, self.sender);

        PendingTx::submit(self.chain.clone(), tx).await
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("sender", &self.sender)
            .finish()
    }
}
