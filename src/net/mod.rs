//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (parse address, bind socket)
//!     → Hand the bound listener to the HTTP server
//! ```
//!
//! # Design Decisions
//! - Bind failures are fatal and reported before any request is served
//! - TLS termination happens in front of the gateway, not here

pub mod listener;

pub use listener::{bind, ListenerError};
