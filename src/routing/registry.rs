//! Backend registry.
//!
//! # Responsibilities
//! - Parse backend addresses into endpoints
//! - Store compiled routes in configuration order
//! - Look up matching route for a request path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Construction fails on any invalid route; there is no partial registry
//! - O(n) prefix scan (acceptable for typical route counts)

use std::collections::HashMap;

use axum::http::uri::{Authority, Scheme};
use url::Url;

use crate::config::{RouteConfig, ValidationError};
use crate::routing::matcher::{match_route, PathPrefix, RouteMatch};

/// Network address of a backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    authority: Authority,
}

impl Endpoint {
    /// Parse an address such as "http://localhost:8081".
    ///
    /// Only plain `http` is accepted; the port defaults to 80 when omitted.
    pub fn parse(address: &str) -> Result<Self, String> {
        let url = Url::parse(address).map_err(|e| e.to_string())?;

        if url.scheme() != "http" {
            return Err(format!("unsupported scheme {:?}", url.scheme()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err("credentials are not allowed".to_string());
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err("address must not carry a path, query or fragment".to_string());
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| "missing host".to_string())?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| "missing port".to_string())?;
        if port == 0 {
            return Err("port must be between 1 and 65535".to_string());
        }

        let authority = Authority::try_from(format!("{}:{}", host, port).as_str())
            .map_err(|e| e.to_string())?;

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// "host:port", used for the outbound URI and Host header.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// A compiled route: prefix, backend and rewrite policy.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    prefix: PathPrefix,
    backend: Endpoint,
    strip_prefix: bool,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    pub fn backend(&self) -> &Endpoint {
        &self.backend
    }

    pub fn strip_prefix(&self) -> bool {
        self.strip_prefix
    }
}

/// Ordered, immutable table of routes.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    routes: Vec<Route>,
}

impl Registry {
    /// Compile route configuration, reporting every invalid entry.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut routes = Vec::with_capacity(configs.len());
        let mut seen: HashMap<PathPrefix, String> = HashMap::new();

        for (index, config) in configs.iter().enumerate() {
            if config.name.trim().is_empty() {
                errors.push(ValidationError::EmptyRouteName { index });
            }

            let prefix = match PathPrefix::new(&config.prefix) {
                Some(p) => p,
                None => {
                    errors.push(ValidationError::InvalidPrefix {
                        route: config.name.clone(),
                        prefix: config.prefix.clone(),
                    });
                    continue;
                }
            };

            if let Some(existing) = seen.get(&prefix) {
                errors.push(ValidationError::DuplicatePrefix {
                    route: config.name.clone(),
                    prefix: prefix.to_string(),
                    existing: existing.clone(),
                });
                continue;
            }
            seen.insert(prefix.clone(), config.name.clone());

            let backend = match Endpoint::parse(&config.backend) {
                Ok(e) => e,
                Err(reason) => {
                    errors.push(ValidationError::InvalidBackendAddress {
                        route: config.name.clone(),
                        address: config.backend.clone(),
                        reason,
                    });
                    continue;
                }
            };

            routes.push(Route {
                name: config.name.clone(),
                prefix,
                backend,
                strip_prefix: config.strip_prefix,
            });
        }

        if errors.is_empty() {
            Ok(Self { routes })
        } else {
            Err(errors)
        }
    }

    /// All routes in configuration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up the most specific route for a request path.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        match_route(&self.routes, path)
    }
}
