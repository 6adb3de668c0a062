use anyhow::Result;
use civic_common::observability::init_logging;
use civic_config::{CivicConfig, CivicConfigLoader};
use clap::Parser;
use std::path::PathBuf;
use wiring::{build_state, run_until_ctrl_c};
mod wiring;

/// CivicSense explanation API server.
#[derive(Debug, Parser)]
#[command(name = "civicsense", version, about)]
struct Args {
    /// YAML config file; skipped when it does not exist.
    #[arg(short, long, env = "CIVIC_CONFIG", default_value = "civicsense.yaml")]
    config: PathBuf,

    /// Override `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins over file, flags win over env)
    let mut cfg: CivicConfig = CivicConfigLoader::new()
        .with_optional_file(&args.config)
        .load()?;
    if let Some(host) = args.host {
        cfg.server.host = host;
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }

    let log_path = init_logging(cfg.logging.to_log_config("civicsense"))?;
    tracing::info!(log = %log_path.display(), config = %args.config.display(), "startup");

    // 2) Refuse to start without a credential
    let state = build_state(&cfg)?;

    run_until_ctrl_c(&cfg, state).await
}
