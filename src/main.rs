//! API Gateway (v1)
//!
//! A path-routing HTTP gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────┐
//!     ────────────────────┼─▶ listener ─▶ http server ─▶ routing registry│
//!                         │                                  │     │     │
//!                         │                          matched │     │ no  │
//!                         │                                  ▼     ▼     │
//!     Client Response     │                          forwarder  fallback │
//!     ◀───────────────────┼──────────────────────────────┘  ▲            │
//!                         │                                 │            │
//!                         └─────────────────────────────────┼────────────┘
//!                                                           ▼
//!                                                    Backend services
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use api_gateway::config::load_config;
use api_gateway::lifecycle::{self, signals, Shutdown};
use api_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Path-routing HTTP gateway for backend microservices", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long, env = "GATEWAY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the file, so this one goes to stderr.
            eprintln!("api-gateway: failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "api-gateway starting"
    );

    let (server, listener) = match lifecycle::start(config).await {
        Ok(started) => started,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    // Validated during startup, so the address parses whenever metrics are on.
    let observability = &server.config().observability;
    if observability.metrics_enabled {
        if let Ok(addr) = observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    if let Err(e) = server.run(listener, server_shutdown).await {
        tracing::error!(error = %e, "Server terminated with error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
