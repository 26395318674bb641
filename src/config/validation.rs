//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect conflicting routes (duplicate prefixes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Route checks are the same ones the Registry runs when it is built

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;
use crate::routing::Registry;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {address:?} is not a socket address: {reason}")]
    InvalidBindAddress { address: String, reason: String },

    #[error("observability.metrics_address {address:?} is not a socket address: {reason}")]
    InvalidMetricsAddress { address: String, reason: String },

    #[error("timeouts.{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("route #{index} has an empty name")]
    EmptyRouteName { index: usize },

    #[error("route {route:?}: prefix {prefix:?} must be non-empty and start with '/'")]
    InvalidPrefix { route: String, prefix: String },

    #[error("route {route:?}: prefix {prefix:?} is already used by route {existing:?}")]
    DuplicatePrefix {
        route: String,
        prefix: String,
        existing: String,
    },

    #[error("route {route:?}: backend address {address:?} is invalid: {reason}")]
    InvalidBackendAddress {
        route: String,
        address: String,
        reason: String,
    },
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
            reason: e.to_string(),
        });
    }

    let observability = &config.observability;
    if observability.metrics_enabled {
        if let Err(e) = observability.metrics_address.parse::<SocketAddr>() {
            errors.push(ValidationError::InvalidMetricsAddress {
                address: observability.metrics_address.clone(),
                reason: e.to_string(),
            });
        }
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("request_secs", config.timeouts.request_secs),
        ("pool_idle_secs", config.timeouts.pool_idle_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    if let Err(route_errors) = Registry::from_config(&config.routes) {
        errors.extend(route_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
