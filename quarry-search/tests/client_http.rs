//! HTTP-level client tests against a local stub standing in for Meilisearch.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use quarry_search::{MeiliClient, MeiliError, SearchQuery, CHUNKS_INDEX};

/// Requests the stub has seen, as (authorization header, body) pairs.
#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Captured {
    fn record(&self, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.requests.lock().unwrap().push((auth, body));
    }

    fn take(&self) -> Vec<(String, Value)> {
        std::mem::take(&mut self.requests.lock().unwrap())
    }
}

async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn search_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.record(&headers, body);
    Json(json!({
        "hits": [
            {"chunk_id": "ab12-1-1", "text": "grain elevator", "_formatted": {"text": "<mark>grain</mark> elevator"}}
        ],
        "query": "grain",
        "processingTimeMs": 2,
        "limit": 20,
        "offset": 0,
        "estimatedTotalHits": 57
    }))
}

async fn documents_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.record(&headers, body);
    Json(json!({"taskUid": 7, "indexUid": "chunks", "status": "enqueued"}))
}

#[tokio::test]
async fn search_sends_bearer_auth_and_body() {
    let captured = Captured::default();
    let router = Router::new()
        .route("/indexes/chunks/search", post(search_ok))
        .with_state(captured.clone());
    let addr = spawn_stub(router).await;

    let client = MeiliClient::new(format!("http://{}", addr), "test-key");
    let query = SearchQuery {
        q: "grain".to_string(),
        attributes_to_highlight: Some(vec!["text".to_string()]),
        highlight_pre_tag: Some("<mark>".to_string()),
        highlight_post_tag: Some("</mark>".to_string()),
        ..SearchQuery::default()
    };
    let response = client.search(CHUNKS_INDEX, &query).await.unwrap();

    assert_eq!(response.query, "grain");
    assert_eq!(response.hits.len(), 1);
    assert_eq!(response.total(), 57);

    let requests = captured.take();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth, "Bearer test-key");
    assert_eq!(body["q"], "grain");
    assert_eq!(body["limit"], 20);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["attributesToHighlight"], json!(["text"]));
    assert_eq!(body["highlightPreTag"], "<mark>");
    assert_eq!(body["highlightPostTag"], "</mark>");
}

#[tokio::test]
async fn search_surfaces_upstream_error_body() {
    async fn search_err() -> (StatusCode, &'static str) {
        (
            StatusCode::BAD_REQUEST,
            r#"{"message":"Index `chunks` not found."}"#,
        )
    }
    let router = Router::new().route("/indexes/chunks/search", post(search_err));
    let addr = spawn_stub(router).await;

    let client = MeiliClient::new(format!("http://{}", addr), "test-key");
    let err = client
        .search(CHUNKS_INDEX, &SearchQuery::default())
        .await
        .unwrap_err();

    match err {
        MeiliError::Upstream { status, body } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, r#"{"message":"Index `chunks` not found."}"#);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn add_documents_posts_batch_and_parses_task() {
    let captured = Captured::default();
    let router = Router::new()
        .route("/indexes/chunks/documents", post(documents_ok))
        .with_state(captured.clone());
    let addr = spawn_stub(router).await;

    let client = MeiliClient::new(format!("http://{}", addr), "test-key");
    let docs = vec![
        json!({"chunk_id": "ab12-1-1", "text": "first"}),
        json!({"chunk_id": "ab12-1-2", "text": "second"}),
    ];
    let task = client.add_documents(CHUNKS_INDEX, &docs).await.unwrap();

    assert_eq!(task.task_uid, 7);
    assert_eq!(task.status, "enqueued");

    let requests = captured.take();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth, "Bearer test-key");
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["chunk_id"], "ab12-1-1");
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Bind then drop so the port is very likely unoccupied.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = MeiliClient::new(format!("http://{}", addr), "test-key");
    let err = client
        .search(CHUNKS_INDEX, &SearchQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MeiliError::Transport { .. }));
}
