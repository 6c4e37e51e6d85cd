//! echocheck binary.

use std::process::ExitCode;

use echocheck::{httpbin_scenarios, run_suite};
use echocheck_infrastructure::HarnessConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HarnessConfig::load().await?;
    tracing::info!(
        base_url = %config.base_url,
        concurrency = config.concurrency,
        "Starting echocheck v{}",
        env!("CARGO_PKG_VERSION")
    );

    let report = run_suite(&config, httpbin_scenarios()).await?;

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
