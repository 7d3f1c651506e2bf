use ethers::types::{TransactionReceipt, U256};
use tokio::sync::Mutex;

use crate::blockchain::PendingTx;
use crate::models::{GasReport, GasSummary};
use crate::utils::Result;

/// Records what every confirmed transaction of a run cost
#[derive(Debug, Default)]
pub struct GasReporter {
    reports: Mutex<Vec<GasReport>>,
    quiet: bool,
}

impl GasReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep reports for the summary but don't print them
    pub fn quiet() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            quiet: true,
        }
    }

    /// Wait for `pending` to confirm, then report its gas under `label`
    pub async fn report(&self, pending: PendingTx, label: &str) -> Result<TransactionReceipt> {
        let submitted_price = pending.gas_price();
        let receipt = pending.confirm().await?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt
            .effective_gas_price
            .or(submitted_price)
            .unwrap_or_else(U256::zero);

        let report = GasReport::new(label, gas_used, gas_price);

        if !self.quiet {
            println!("{}", report);
        }
        tracing::info!(
            "⛽ {}: {} gas @ {} wei = {} ETH",
            label,
            report.gas_used,
            report.gas_price,
            report.cost_in_ether()
        );

        self.reports.lock().await.push(report);

        Ok(receipt)
    }

    /// Snapshot of every report so far
    pub async fn summary(&self) -> GasSummary {
        GasSummary {
            reports: self.reports.lock().await.clone(),
        }
    }
}
