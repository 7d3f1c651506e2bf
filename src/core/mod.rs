pub mod deployer;
pub mod gas;
pub mod runner;
pub mod traits;

pub use deployer::{deploy_uniswap, ether, Deployer, Deployment};
pub use gas::GasReporter;
pub use runner::{run_suite, ScenarioRunner};
pub use traits::Scenario;
