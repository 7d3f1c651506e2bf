use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ethers::types::U256;
use uniswap_v2_harness::blockchain;
use uniswap_v2_harness::*;

/// Deploy Uniswap V2 to a local chain and check pair creation and liquidity
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory with the compiled contract artifacts
    #[arg(short, long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// JSON-RPC node with unlocked accounts (default: in-process simulator)
    #[arg(short, long, conflicts_with = "spawn_anvil")]
    rpc: Option<String>,

    /// Start a local anvil node and use it
    #[arg(long)]
    spawn_anvil: bool,

    /// Simulator gas price in wei
    #[arg(long, value_name = "WEI")]
    gas_price: Option<u64>,

    /// Run only this scenario (repeatable)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,

    /// Print the suite report as JSON
    #[arg(long)]
    json: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> HarnessConfig {
        let target = if let Some(url) = self.rpc {
            ChainTarget::Rpc(url)
        } else if self.spawn_anvil {
            ChainTarget::SpawnAnvil
        } else {
            let mut simulator = SimulatorConfig::default();
            if let Some(price) = self.gas_price {
                simulator.gas_price = U256::from(price);
            }
            ChainTarget::Simulated(simulator)
        };

        HarnessConfig::new(self.artifacts, target).with_only(self.only)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Setup logging; stdout is reserved for the report
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("uniswap_v2_harness=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("uniswap_v2_harness=info")
            .with_writer(std::io::stderr)
            .init();
    }

    let json = args.json;

    match run(args.into_config(), json).await {
        Ok(report) if report.passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(config: HarnessConfig, json: bool) -> Result<SuiteReport> {
    let known = ScenarioRunner::default_suite().scenario_names();
    let unknown = config
        .only
        .iter()
        .find(|name| !known.iter().any(|k| *k == name.as_str()));
    if let Some(unknown) = unknown {
        return Err(HarnessError::Config(format!(
            "unknown scenario '{}' (expected one of: {})",
            unknown,
            known.join(", ")
        )));
    }

    if !json {
        println!("\n🦄 Uniswap V2 Deployment Harness");
        println!("================================\n");
    }

    let artifacts = ArtifactSet::load_dir(&config.artifacts_dir)?;
    let chain = blockchain::connect(&config.target).await?;

    let gas = Arc::new(if json {
        GasReporter::quiet()
    } else {
        GasReporter::new()
    });

    let report = run_suite(chain, &artifacts, config.only, gas).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{}", report);
    }

    Ok(report)
}
