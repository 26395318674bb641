//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix on segment boundaries (case-sensitive)
//! - Select the most specific (longest) matching prefix
//! - Compute the path the backend should observe
//!
//! # Design Decisions
//! - "/orders" matches "/orders" and "/orders/..." but never "/ordersX"
//! - Longest prefix wins; the Registry guarantees prefixes are unique
//! - Matching runs on the raw request path; the query string is not consulted
//! - No regex to guarantee O(n) matching

use crate::routing::registry::Route;

/// A normalized route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    /// Normalize a configured prefix.
    ///
    /// Trailing slashes are trimmed ("/orders/" becomes "/orders"), except for
    /// the bare "/" which stays a catch-all. Returns `None` when the prefix is
    /// empty or does not start with '/'.
    pub fn new(raw: &str) -> Option<Self> {
        if !raw.starts_with('/') {
            return None;
        }
        let trimmed = raw.trim_end_matches('/');
        let prefix = if trimmed.is_empty() { "/" } else { trimmed };
        Some(Self {
            prefix: prefix.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn len(&self) -> usize {
        self.prefix.len()
    }

    fn is_root(&self) -> bool {
        self.prefix == "/"
    }

    /// Returns true if `path` equals the prefix or continues it with '/'.
    pub fn matches(&self, path: &str) -> bool {
        if self.is_root() {
            return true;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Remove the prefix from a matching path. An empty remainder becomes "/".
    pub fn strip(&self, path: &str) -> String {
        if self.is_root() {
            return path.to_string();
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") | None => "/".to_string(),
            Some(rest) => rest.to_string(),
        }
    }
}

impl std::fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful lookup: the selected route and the path to forward.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub remaining_path: String,
}

/// Find the route with the longest prefix matching `path`.
pub fn match_route<'a>(routes: &'a [Route], path: &str) -> Option<RouteMatch<'a>> {
    let route = routes
        .iter()
        .filter(|r| r.prefix().matches(path))
        .max_by_key(|r| r.prefix().len())?;

    let remaining_path = if route.strip_prefix() {
        route.prefix().strip(path)
    } else {
        path.to_string()
    };

    Some(RouteMatch {
        route,
        remaining_path,
    })
}
