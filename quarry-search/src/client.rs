//! Meilisearch REST API client
//!
//! Direct HTTP integration, no SDK. The proxy queries through
//! [`MeiliClient::search`]; the ingestion pipeline pushes chunk documents
//! through [`MeiliClient::add_documents`].

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Index holding one document per text chunk.
pub const CHUNKS_INDEX: &str = "chunks";

/// Errors from talking to Meilisearch
#[derive(Debug, Error)]
pub enum MeiliError {
    /// Host or master key missing from the environment
    #[error("MEILI_HOST and MEILI_MASTER_KEY are required")]
    MissingConfig,

    /// Request never produced a response (connect failure, timeout,
    /// undecodable body)
    #[error("meilisearch request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// Meilisearch answered with a non-success status
    #[error("meilisearch returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
}

/// Request body for `POST /indexes/{index}/search`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Full-text query string
    pub q: String,
    /// Maximum hits to return (default: 20)
    pub limit: i64,
    /// Hits to skip for pagination (default: 0)
    pub offset: i64,
    /// Fields to wrap match markers around
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_highlight: Option<Vec<String>>,
    /// Opening marker inserted around matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_pre_tag: Option<String>,
    /// Closing marker inserted around matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_post_tag: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            limit: 20,
            offset: 0,
            attributes_to_highlight: None,
            highlight_pre_tag: None,
            highlight_post_tag: None,
        }
    }
}

/// Response body from `POST /indexes/{index}/search`
///
/// Hits stay as raw JSON objects. Meilisearch reports the total as
/// `estimatedTotalHits` for plain queries and `totalHits` when exhaustive
/// pagination is requested; either may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
    pub estimated_total_hits: Option<u64>,
    pub total_hits: Option<u64>,
}

impl SearchResponse {
    /// Total matches reported by the engine, zero when it reported neither
    /// form.
    pub fn total(&self) -> u64 {
        self.estimated_total_hits.or(self.total_hits).unwrap_or(0)
    }
}

/// Acknowledgement for a queued document write
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub task_uid: i64,
    #[serde(default)]
    pub status: String,
}

/// Meilisearch HTTP client
#[derive(Clone, Debug)]
pub struct MeiliClient {
    http: Client,
    host: String,
    master_key: String,
}

impl MeiliClient {
    /// Create a client for the given host. Trailing slashes on the host are
    /// stripped before URL assembly.
    pub fn new(host: impl Into<String>, master_key: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            host,
            master_key: master_key.into(),
        }
    }

    /// Create a client from environment variables
    /// Reads MEILI_HOST and MEILI_MASTER_KEY; empty values count as unset.
    pub fn from_env() -> Result<Self, MeiliError> {
        let host = std::env::var("MEILI_HOST").ok().filter(|v| !v.is_empty());
        let master_key = std::env::var("MEILI_MASTER_KEY")
            .ok()
            .filter(|v| !v.is_empty());
        match (host, master_key) {
            (Some(host), Some(master_key)) => Ok(Self::new(host, master_key)),
            _ => Err(MeiliError::MissingConfig),
        }
    }

    /// Host this client talks to (scheme and authority, no trailing slash)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run a search against one index
    pub async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse, MeiliError> {
        let url = format!("{}/indexes/{}/search", self.host, index);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.master_key))
            .json(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MeiliError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }

    /// Add or replace documents in one index
    ///
    /// Meilisearch queues the write and acknowledges with a task reference;
    /// the documents become searchable once the task is processed.
    pub async fn add_documents(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<TaskRef, MeiliError> {
        let url = format!("{}/indexes/{}/documents", self.host, index);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.master_key))
            .json(&documents)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MeiliError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }
}
