//! Search proxy endpoint
//!
//! Fronts the Meilisearch `chunks` index: validates the query, forwards it
//! with highlighting enabled, and normalizes the engine response into
//! `{query, hits, offset, limit, total}`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quarry_search::{SearchQuery, CHUNKS_INDEX};

use crate::http::error::ApiError;
use crate::http::server::AppState;

const DEFAULT_LIMIT: i64 = 20;
const DEFAULT_OFFSET: i64 = 0;

/// Field wrapped with match markers in every hit.
const HIGHLIGHT_FIELD: &str = "text";
const HIGHLIGHT_PRE_TAG: &str = "<mark>";
const HIGHLIGHT_POST_TAG: &str = "</mark>";

/// Search request parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Normalized search response
///
/// `hits`, `offset` and `limit` are the engine's values verbatim; `total`
/// collapses the engine's two count fields into one.
#[derive(Debug, Serialize)]
pub struct SearchProxyResponse {
    pub query: String,
    pub hits: Vec<Value>,
    pub offset: i64,
    pub limit: i64,
    pub total: u64,
}

/// GET /search - proxy a query to the chunks index
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchProxyResponse>, ApiError> {
    // Configuration is checked before the query so a misconfigured deploy
    // is not reported as a client error.
    let client = state.search.as_ref().ok_or(ApiError::SearchUnconfigured)?;

    let q = params.q.as_deref().unwrap_or("").trim();
    if q.is_empty() {
        return Err(ApiError::MissingQuery);
    }

    let query = SearchQuery {
        q: q.to_string(),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
        offset: params.offset.unwrap_or(DEFAULT_OFFSET),
        attributes_to_highlight: Some(vec![HIGHLIGHT_FIELD.to_string()]),
        highlight_pre_tag: Some(HIGHLIGHT_PRE_TAG.to_string()),
        highlight_post_tag: Some(HIGHLIGHT_POST_TAG.to_string()),
    };

    let data = client.search(CHUNKS_INDEX, &query).await?;
    let total = data.total();

    Ok(Json(SearchProxyResponse {
        query: data.query,
        hits: data.hits,
        offset: data.offset,
        limit: data.limit,
        total,
    }))
}

/// Search routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search))
}
