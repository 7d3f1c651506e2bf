use ethers::types::U256;
use ethers::utils::format_ether;
use serde::{Deserialize, Serialize};

/// Gas spent by one confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasReport {
    pub method: String,
    pub gas_used: U256,
    /// Effective price in wei
    pub gas_price: U256,
    /// `gas_used * gas_price`, in wei
    pub total_cost: U256,
}

impl GasReport {
    pub fn new(method: impl Into<String>, gas_used: U256, gas_price: U256) -> Self {
        Self {
            method: method.into(),
            gas_used,
            gas_price,
            total_cost: gas_used.saturating_mul(gas_price),
        }
    }

    pub fn cost_in_ether(&self) -> String {
        format_ether(self.total_cost)
    }
}

impl std::fmt::Display for GasReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Gas Report for {}:", self.method)?;
        writeln!(f, "    Actual Gas Used: {}", self.gas_used)?;
        writeln!(f, "    Gas Price: {} wei", self.gas_price)?;
        write!(f, "    Total Cost: {} ETH", self.cost_in_ether())
    }
}

/// Every gas report of a run, in submission order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GasSummary {
    pub reports: Vec<GasReport>,
}

impl GasSummary {
    pub fn total_gas(&self) -> U256 {
        self.reports
            .iter()
            .fold(U256::zero(), |acc, r| acc.saturating_add(r.gas_used))
    }

    pub fn total_cost(&self) -> U256 {
        self.reports
            .iter()
            .fold(U256::zero(), |acc, r| acc.saturating_add(r.total_cost))
    }
}

impl std::fmt::Display for GasSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .reports
            .iter()
            .map(|r| r.method.len())
            .max()
            .unwrap_or(0)
            .max("Total".len());

        writeln!(f, "═══ GAS ═══")?;
        for report in &self.reports {
            writeln!(
                f,
                "{:<width$}  {:>10} gas  {} ETH",
                report.method,
                report.gas_used.to_string(),
                report.cost_in_ether(),
                width = width
            )?;
        }
        write!(
            f,
            "{:<width$}  {:>10} gas  {} ETH",
            "Total",
            self.total_gas().to_string(),
            format_ether(self.total_cost()),
            width = width
        )
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u128,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub chain: String,
    pub outcomes: Vec<ScenarioOutcome>,
    pub gas: GasSummary,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

impl std::fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "═══════════════════════════════════════════════════════════")?;
        writeln!(f, "              UNISWAP V2 DEPLOYMENT REPORT")?;
        writeln!(f, "═══════════════════════════════════════════════════════════")?;
        writeln!(f)?;
        writeln!(f, "Chain: {}", self.chain)?;
        writeln!(f)?;
        writeln!(f, "═══ SCENARIOS ═══")?;

        for outcome in &self.outcomes {
            let mark = if outcome.passed { "✅" } else { "❌" };
            match &outcome.error {
                Some(error) => writeln!(
                    f,
                    "{} {} ({} ms): {}",
                    mark, outcome.name, outcome.elapsed_ms, error
                )?,
                None => writeln!(f, "{} {} ({} ms)", mark, outcome.name, outcome.elapsed_ms)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Passed: {}/{}",
            self.outcomes.len() - self.failed_count(),
            self.outcomes.len()
        )?;

        if !self.gas.reports.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.gas)?;
        }

        writeln!(f)?;
        writeln!(f, "═══════════════════════════════════════════════════════════")?;

        Ok(())
    }
}
