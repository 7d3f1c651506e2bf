use std::sync::Arc;
use std::time::Instant;

use crate::blockchain::Chain;
use crate::core::{deploy_uniswap, Deployment, GasReporter, Scenario};
use crate::models::{ArtifactSet, ScenarioOutcome, SuiteReport};
use crate::scenarios::{AddLiquidity, CreatePair, FactoryFeeToSetter, RouterWiring};
use crate::utils::{HarnessError, Result};

pub struct ScenarioRunner {
    scenarios: Vec<Arc<dyn Scenario>>,
    only: Vec<String>,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
            only: Vec::new(),
        }
    }

    /// The fixed Uniswap V2 suite, in order
    pub fn default_suite() -> Self {
        Self::new()
            .add_scenario(Arc::new(FactoryFeeToSetter))
            .add_scenario(Arc::new(RouterWiring))
            .add_scenario(Arc::new(CreatePair))
            .add_scenario(Arc::new(AddLiquidity))
    }

    pub fn add_scenario(mut self, scenario: Arc<dyn Scenario>) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Run only the named scenarios (empty = all), keeping suite order
    pub fn with_filter(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn scenario_names(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    fn selected(&self, scenario: &dyn Scenario) -> bool {
        self.only.is_empty() || self.only.iter().any(|name| name == scenario.name())
    }

    /// Run every selected scenario; failures are recorded and never stop the run
    pub async fn run(&self, deployment: &Deployment, gas: &GasReporter) -> SuiteReport {
        let mut outcomes = Vec::new();

        for scenario in &self.scenarios {
            if !self.selected(scenario.as_ref()) {
                tracing::debug!("Skipping scenario '{}'", scenario.name());
                continue;
            }

            tracing::info!("▶ {}", scenario.name());
            let started = Instant::now();

            let outcome = match scenario.run(deployment, gas).await {
                Ok(()) => ScenarioOutcome {
                    name: scenario.name().to_string(),
                    passed: true,
                    error: None,
                    elapsed_ms: started.elapsed().as_millis(),
                },
                Err(e) => {
                    tracing::warn!("Scenario '{}' failed: {}", scenario.name(), e);
                    ScenarioOutcome {
                        name: scenario.name().to_string(),
                        passed: false,
                        error: Some(e.to_string()),
                        elapsed_ms: started.elapsed().as_millis(),
                    }
                }
            };

            outcomes.push(outcome);
        }

        SuiteReport {
            chain: deployment.chain().name(),
            outcomes,
            gas: gas.summary().await,
        }
    }
}

/// Deploy from the chain's first account, then run the (filtered) default suite
pub async fn run_suite(
    chain: Arc<dyn Chain>,
    artifacts: &ArtifactSet,
    only: Vec<String>,
    gas: Arc<GasReporter>,
) -> Result<SuiteReport> {
    let owner = chain
        .accounts()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| HarnessError::Config("chain exposes no accounts".to_string()))?;

    let deployment = deploy_uniswap(chain, artifacts, owner, gas.clone()).await?;

    Ok(ScenarioRunner::default_suite()
        .with_filter(only)
        .run(&deployment, &gas)
        .await)
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::default_suite()
    }
}
