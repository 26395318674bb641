//! TCP listener binding.
//!
//! # Responsibilities
//! - Parse the configured bind address
//! - Bind the listening socket
//! - Report bind failures as a distinct startup error

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The configured address is not a socket address.
    #[error("invalid bind address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Failed to bind to address (in use, permission denied, ...).
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|e: std::net::AddrParseError| ListenerError::InvalidAddress {
            address: config.bind_address.clone(),
            reason: e.to_string(),
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { address: addr, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenerError::Bind { address: addr, source })?;

    tracing::info!(
        address = %local_addr,
        "Listener bound"
    );

    Ok(listener)
}
