//! Index stage: processed payloads into Meilisearch
//!
//! Chunks are flattened into search records and pushed to the chunks
//! index in batches. Records carry their provenance fields so the search
//! surface never has to join back to Postgres.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use quarry_search::{MeiliClient, CHUNKS_INDEX};

use crate::payload::{list_processed, ProcessedDocument};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Counts for one index run
#[derive(Debug, Default)]
pub struct IndexSummary {
    pub chunks: usize,
    pub batches: usize,
}

/// Flatten one processed document into search records.
///
/// Record ids must stay within Meilisearch's id charset, which allows only
/// alphanumerics, hyphens and underscores.
pub fn build_chunk_records(document: &ProcessedDocument) -> Vec<Value> {
    let source_host = document.meta.source_host();
    document
        .chunks
        .iter()
        .map(|chunk| {
            json!({
                "chunk_id": format!(
                    "{}-{}-{}",
                    document.file_sha256, chunk.page_no, chunk.chunk_no
                ),
                "doc_id": document.meta.doc_id,
                "page_no": chunk.page_no,
                "text": chunk.text,
                "dataset": document.meta.dataset,
                "published_date": document.meta.published_date,
                // Entity fields stay empty until an enrichment stage fills them.
                "entities": [],
                "entity_ids": [],
                "source_url": document.meta.source_url,
                "title": document.meta.title,
                "source_host": source_host,
            })
        })
        .collect()
}

async fn push_batch(
    client: &MeiliClient,
    batch: &mut Vec<Value>,
    summary: &mut IndexSummary,
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }
    let task = client
        .add_documents(CHUNKS_INDEX, batch)
        .await
        .context("failed to push chunk batch to the search index")?;
    tracing::info!(
        "Queued {} records as task {} ({})",
        batch.len(),
        task.task_uid,
        task.status
    );
    summary.batches += 1;
    batch.clear();
    Ok(())
}

/// Push every chunk under `processed_dir` to the search index.
pub async fn index_processed(
    client: &MeiliClient,
    processed_dir: &Path,
    batch_size: usize,
    max_docs: Option<usize>,
) -> Result<IndexSummary> {
    let paths = list_processed(processed_dir, max_docs)?;

    let mut summary = IndexSummary::default();
    let mut batch: Vec<Value> = Vec::new();
    for path in &paths {
        let document = ProcessedDocument::read(path)?;
        let records = build_chunk_records(&document);
        summary.chunks += records.len();
        batch.extend(records);
        if batch.len() >= batch_size {
            push_batch(client, &mut batch, &mut summary).await?;
        }
    }
    push_batch(client, &mut batch, &mut summary).await?;

    Ok(summary)
}
