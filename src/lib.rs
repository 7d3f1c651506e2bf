pub mod config;
pub mod contracts;      // Artifact names + contract handles
pub mod scenarios;      // The fixed assertion suite

pub mod core;
pub mod models;
pub mod blockchain;
pub mod utils;

pub use blockchain::{Chain, RpcChain, SimulatedChain};
pub use config::{ChainTarget, HarnessConfig, SimulatorConfig};
pub use core::{deploy_uniswap, run_suite, Deployer, Deployment, GasReporter, Scenario, ScenarioRunner};
pub use models::{Artifact, ArtifactSet, GasReport, GasSummary, ScenarioOutcome, SuiteReport};
pub use utils::{HarnessError, Result};
