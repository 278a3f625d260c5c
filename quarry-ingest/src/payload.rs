//! Processed-document payloads on disk
//!
//! One JSON file per source document, named by the source file's sha256.
//! Provenance rides along in an optional `<stem>.meta.json` sidecar next to
//! the input and is embedded into the payload during processing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use walkdir::WalkDir;

use crate::chunker::Chunk;

/// Extracted text of one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page_no: i32,
    pub text: String,
}

/// Provenance for a source document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocMeta {
    pub source_url: Option<String>,
    pub title: Option<String>,
    pub dataset: Option<String>,
    pub published_date: Option<String>,
    /// Database id, written back once load-db has assigned it
    pub doc_id: Option<String>,
}

impl DocMeta {
    /// Host component of the source URL, when one is set and parseable.
    pub fn source_host(&self) -> Option<String> {
        self.source_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// One processed source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub file_sha256: String,
    pub page_count: i32,
    pub pages: Vec<PageText>,
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub meta: DocMeta,
}

impl ProcessedDocument {
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid processed payload {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// List processed payload files under a directory, sorted by path.
pub fn list_processed(dir: &Path, max_docs: Option<usize>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("processed directory {} does not exist", dir.display());
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    if let Some(max) = max_docs {
        paths.truncate(max);
    }
    Ok(paths)
}
