use std::sync::Arc;

use ethers::abi::Tokenize;
use ethers::contract::BaseContract;
use ethers::types::{Address, Bytes, TransactionRequest, U256};

use crate::blockchain::{Chain, PendingTx};
use crate::contracts::{names, ContractHandle};
use crate::core::GasReporter;
use crate::models::{Artifact, ArtifactSet};
use crate::utils::{HarnessError, Result};

/// `n` whole tokens at 18 decimals
pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

/// Deploys artifacts from one account, one confirmed transaction at a time
pub struct Deployer {
    chain: Arc<dyn Chain>,
    sender: Address,
    gas: Arc<GasReporter>,
}

impl Deployer {
    pub fn new(chain: Arc<dyn Chain>, sender: Address, gas: Arc<GasReporter>) -> Self {
        Self { chain, sender, gas }
    }

    /// Deploy `artifact` with constructor `args` and wait for its address
    pub async fn deploy<T>(&self, artifact: &Artifact, args: T) -> Result<ContractHandle>
    where
        T: Tokenize + Send,
    {
        let name = artifact.name.clone();
        self.try_deploy(artifact, args)
            .await
            .map_err(|e| match e {
                HarnessError::Deployment { .. } => e,
                other => HarnessError::Deployment {
                    contract: name,
                    reason: other.to_string(),
                },
            })
    }

    async fn try_deploy<T>(&self, artifact: &Artifact, args: T) -> Result<ContractHandle>
    where
        T: Tokenize + Send,
    {
        if !artifact.is_deployable() {
            return Err(HarnessError::Deployment {
                contract: artifact.name.clone(),
                reason: "artifact has no creation bytecode".to_string(),
            });
        }

        let code = creation_code(artifact, args)?;
        let tx = TransactionRequest::new().from(self.sender).data(code);

        tracing::debug!("Deploying {} from {:?}", artifact.name, self.sender);

        let pending = PendingTx::submit(self.chain.clone(), tx).await?;
        let receipt = self
            .gas
            .report(pending, &format!("deploy {}", artifact.name))
            .await?;

        let address = receipt.contract_address.ok_or_else(|| HarnessError::Deployment {
            contract: artifact.name.clone(),
            reason: "receipt has no contract address".to_string(),
        })?;

        tracing::info!("📦 {} deployed at {:?}", artifact.name, address);

        Ok(ContractHandle::at(
            artifact.name.clone(),
            address,
            artifact.interface(),
            self.chain.clone(),
            self.sender,
        ))
    }
}

/// Creation bytecode followed by the ABI-encoded constructor arguments
fn creation_code<T: Tokenize>(artifact: &Artifact, args: T) -> Result<Bytes> {
    let tokens = args.into_tokens();

    match artifact.abi.constructor() {
        Some(constructor) => Ok(constructor
            .encode_input(artifact.bytecode.to_vec(), &tokens)?
            .into()),
        None if tokens.is_empty() => Ok(artifact.bytecode.clone()),
        None => Err(HarnessError::Deployment {
            contract: artifact.name.clone(),
            reason: format!("ABI has no constructor but {} arguments were given", tokens.len()),
        }),
    }
}

/// The deployed Uniswap V2 system plus its two test tokens
#[derive(Debug, Clone)]
pub struct Deployment {
    pub owner: Address,
    pub weth: ContractHandle,
    pub factory: ContractHandle,
    pub router: ContractHandle,
    pub token_a: ContractHandle,
    pub token_b: ContractHandle,
    pub pair_interface: BaseContract,
}

impl Deployment {
    pub fn chain(&self) -> Arc<dyn Chain> {
        self.factory.chain()
    }

    /// Handle for a pair the factory created
    pub fn pair_at(&self, address: Address) -> ContractHandle {
        ContractHandle::at(
            names::PAIR,
            address,
            self.pair_interface.clone(),
            self.chain(),
            self.owner,
        )
    }
}

/// Deploy WETH, the factory, the router and two test tokens, in that order
pub async fn deploy_uniswap(
    chain: Arc<dyn Chain>,
    artifacts: &ArtifactSet,
    owner: Address,
    gas: Arc<GasReporter>,
) -> Result<Deployment> {
    tracing::info!("🚀 Deploying Uniswap V2 from {:?}", owner);

    let deployer = Deployer::new(chain, owner, gas);

    let weth = deployer.deploy(&artifacts.weth, ()).await?;
    let factory = deployer.deploy(&artifacts.factory, owner).await?;
    let router = deployer
        .deploy(&artifacts.router, (factory.address(), weth.address()))
        .await?;
    let token_a = deployer
        .deploy(
            &artifacts.test_token,
            ("Token1".to_string(), "TK1".to_string()),
        )
        .await?;
    let token_b = deployer
        .deploy(
            &artifacts.test_token,
            ("Token2".to_string(), "TK2".to_string()),
        )
        .await?;

    let pair_interface = artifacts.pair_interface()?;

    Ok(Deployment {
        owner,
        weth,
        factory,
        router,
        token_a,
        token_b,
        pair_interface,
    })
}
