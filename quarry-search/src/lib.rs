//! quarry-search - Meilisearch client for the quarry stack
//!
//! This crate provides:
//! - A thin HTTP client for the Meilisearch REST API
//! - Request/response types for the `chunks` index that the proxy and
//!   the ingestion pipeline share
//!
//! The client talks to `/indexes/{index}/search` and
//! `/indexes/{index}/documents` directly; hit documents stay as raw JSON
//! so the index schema is owned by whoever writes the documents.

pub mod client;

pub use client::{
    MeiliClient, MeiliError, SearchQuery, SearchResponse, TaskRef, CHUNKS_INDEX,
};
