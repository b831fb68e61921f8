//! Envelope Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum router ──▶ dispatcher ──▶ route table
//!                     (template)          │
//!                                         ▼
//!                                   proxy cache ──▶ proxy handle (per origin)
//!                                                        │ director
//!                                                        ▼
//!     Client Response                                  Backend
//!     ◀────────────── normalizer ◀───────────────────────┘
//!                     (upstream envelope → caller envelope)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use envelope_proxy::config::validation::validate_config;
use envelope_proxy::config::{load_config, ProxyConfig};
use envelope_proxy::ConfigError;
use envelope_proxy::lifecycle::startup;
use envelope_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "envelope-proxy")]
#[command(about = "Reverse proxy that normalizes backend response envelopes", long_about = None)]
struct Cli {
    /// Optional TOML config file. Routes from APP_URI_LIST replace its [routes].
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long, env = "APP_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet.
            eprintln!("envelope-proxy: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);
    tracing::info!("envelope-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    match startup::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Proxy terminated");
            ExitCode::FAILURE
        }
    }
}

fn load(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}
