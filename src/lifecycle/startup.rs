//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Compile the route registry
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, there is no partial service
//! - Starting → Serving happens once; a failure here is terminal
//! - The listener binds last (traffic only when the registry is ready)

use tokio::net::TcpListener;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig};
use crate::http::GatewayServer;
use crate::net::{self, ListenerError};

/// Fatal error while starting the gateway.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("listener error: {0}")]
    Bind(#[from] ListenerError),
}

/// Build everything needed to serve: the server and its bound listener.
pub async fn start(config: GatewayConfig) -> Result<(GatewayServer, TcpListener), StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    let server = GatewayServer::new(config)?;
    let listener = net::bind(&server.config().listener).await?;

    Ok((server, listener))
}
