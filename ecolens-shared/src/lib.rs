//! # EcoLens Shared Library
//!
//! Data model, record store and aggregation logic used by the EcoLens API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: users, emissions and categories with their queries
//! - `db`: record store handle and embedded migrations
//! - `stats`: query-time aggregation (daily totals, breakdowns, dashboards)
//! - `auth`: password hashing, session credentials, bearer verification
//! - `impact`: carbon footprint formatting and ideal-budget equivalents

pub mod auth;
pub mod db;
pub mod impact;
pub mod models;
pub mod stats;

/// Current version of the EcoLens shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
