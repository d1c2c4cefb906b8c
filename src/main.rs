//! Patent Scout BFF server.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use patent_scout_bff::config;
use patent_scout_bff::lifecycle::{startup, Shutdown};
use patent_scout_bff::observability::{logging, monitoring};

#[derive(Parser)]
#[command(name = "patent-scout-bff")]
#[command(about = "Backend-for-frontend proxy for the Patent Scout API", long_about = None)]
struct Args {
    /// Optional TOML config file. Environment variables override it.
    #[arg(short, long, env = "BFF_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::resolve(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    tracing::info!("patent-scout-bff v{} starting", env!("CARGO_PKG_VERSION"));

    monitoring::init(&config.monitoring);

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    let result = startup::run(config, shutdown).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Server exited with error");
        monitoring::sink().capture_error("BFF startup failed", &e.to_string());
    }

    monitoring::shutdown(Duration::from_secs(2));
    tracing::info!("Shutdown complete");
    Ok(result?)
}
