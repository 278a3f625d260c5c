//! quarry-server: HTTP facade over Meilisearch and Postgres
//!
//! Exposes the `chunks` search index through a small JSON API and owns the
//! process-wide Postgres connection pool that the rest of the application
//! queries through.

pub mod db;
pub mod http;
