//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → [routing layer picks a route or none]
//!     → forward.rs (rewrite path, headers.rs, proxy to backend, stream back)
//!     → fallback.rs (fixed greeting when nothing matched)
//!     → Send to client
//! ```

pub mod fallback;
pub mod forward;
pub mod headers;
pub mod request;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::{MakeGatewayRequestId, X_REQUEST_ID};
pub use server::GatewayServer;
