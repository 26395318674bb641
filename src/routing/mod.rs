//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → registry.rs (route table lookup)
//!     → matcher.rs (prefix match, longest wins, optional strip)
//!     → Return: RouteMatch or None (fallback)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Normalize prefixes, parse endpoints
//!     → Reject duplicates
//!     → Freeze as immutable Registry
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Most specific match wins, independent of declaration order

pub mod matcher;
pub mod registry;

pub use matcher::{match_route, PathPrefix, RouteMatch};
pub use registry::{Endpoint, Registry, Route};
