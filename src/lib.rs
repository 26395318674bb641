//! API Gateway Library
//!
//! Routes inbound HTTP requests to backend services by path prefix and
//! relays the exchange as a transparent reverse proxy.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::Registry;
