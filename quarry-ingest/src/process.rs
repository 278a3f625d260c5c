//! Process stage: extracted text in, chunked payloads out
//!
//! Inputs are plain-text extractions with form feeds between pages. Each
//! input becomes one payload file named by the sha256 of the input bytes,
//! so reprocessing the same file overwrites its own payload.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::chunker::chunk_pages;
use crate::payload::{DocMeta, PageText, ProcessedDocument};

/// Counts for one process run
#[derive(Debug, Default)]
pub struct ProcessSummary {
    pub processed: usize,
    pub skipped: usize,
    pub chunks: usize,
}

/// Split extracted text into pages on form-feed separators.
fn split_pages(text: &str) -> Vec<PageText> {
    let mut parts: Vec<&str> = text.split('\x0c').collect();
    // Extractors commonly end the file with a trailing form feed.
    if parts.last().is_some_and(|last| last.trim().is_empty()) {
        parts.pop();
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| PageText {
            page_no: (i + 1) as i32,
            text: part.to_string(),
        })
        .collect()
}

/// Read the optional `<stem>.meta.json` sidecar next to an input file.
fn sidecar_meta(input: &Path) -> Result<DocMeta> {
    let sidecar = input.with_extension("meta.json");
    if !sidecar.exists() {
        return Ok(DocMeta::default());
    }
    let raw = fs::read_to_string(&sidecar)
        .with_context(|| format!("failed to read {}", sidecar.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid sidecar metadata {}", sidecar.display()))
}

/// Process one extracted-text file into a payload under `output_dir`.
///
/// Returns the payload path and the number of chunks it holds.
pub fn process_file(input: &Path, output_dir: &Path) -> Result<(PathBuf, usize)> {
    let bytes =
        fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let file_sha256 = hex::encode(hasher.finalize());

    let text = String::from_utf8_lossy(&bytes);
    let pages = split_pages(&text);
    let chunks = chunk_pages(pages.iter().map(|p| (p.page_no, p.text.as_str())));
    let meta = sidecar_meta(input)?;

    let document = ProcessedDocument {
        file_sha256: file_sha256.clone(),
        page_count: pages.len() as i32,
        pages,
        chunks,
        meta,
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let output = output_dir.join(format!("{file_sha256}.json"));
    document.write(&output)?;

    Ok((output, document.chunks.len()))
}

/// Process every `.txt` file under `input_dir`.
///
/// A file that fails to process is logged and skipped so one bad input
/// cannot sink a batch.
pub fn process_dir(input_dir: &Path, output_dir: &Path) -> Result<ProcessSummary> {
    if !input_dir.is_dir() {
        bail!("input directory {} does not exist", input_dir.display());
    }

    let mut inputs: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    inputs.sort();

    let mut summary = ProcessSummary::default();
    for input in inputs {
        match process_file(&input, output_dir) {
            Ok((output, chunks)) => {
                tracing::info!(
                    "Processed {} into {} ({} chunks)",
                    input.display(),
                    output.display(),
                    chunks
                );
                summary.processed += 1;
                summary.chunks += chunks;
            }
            Err(err) => {
                tracing::warn!("Skipping {}: {:#}", input.display(), err);
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_keyed_by_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        let out = dir.path().join("processed");
        fs::write(&input, "Page one text.\x0cPage two text.").unwrap();

        let (output, chunks) = process_file(&input, &out).unwrap();
        assert_eq!(chunks, 2);

        let mut hasher = Sha256::new();
        hasher.update(fs::read(&input).unwrap());
        let sha = hex::encode(hasher.finalize());
        assert_eq!(output, out.join(format!("{sha}.json")));

        let document = ProcessedDocument::read(&output).unwrap();
        assert_eq!(document.file_sha256, sha);
        assert_eq!(document.page_count, 2);
        assert_eq!(document.pages[1].page_no, 2);
        assert_eq!(document.chunks[1].text, "Page two text.");
        assert!(document.meta.source_url.is_none());
    }

    #[test]
    fn sidecar_metadata_is_carried_into_the_payload() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        let out = dir.path().join("processed");
        fs::write(&input, "Body.").unwrap();
        fs::write(
            dir.path().join("doc.meta.json"),
            r#"{"source_url":"https://files.example.org/doc.pdf","dataset":"ledgers"}"#,
        )
        .unwrap();

        let (output, _) = process_file(&input, &out).unwrap();
        let document = ProcessedDocument::read(&output).unwrap();
        assert_eq!(
            document.meta.source_url.as_deref(),
            Some("https://files.example.org/doc.pdf")
        );
        assert_eq!(document.meta.dataset.as_deref(), Some("ledgers"));
        assert!(document.meta.title.is_none());
    }

    #[test]
    fn trailing_form_feed_does_not_add_a_page() {
        let pages = split_pages("only page\x0c");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_no, 1);
        assert_eq!(pages[0].text, "only page");
    }

    #[test]
    fn empty_input_yields_no_pages() {
        assert!(split_pages("").is_empty());
    }

    #[test]
    fn directory_run_counts_processed_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("in");
        let out = dir.path().join("processed");
        fs::create_dir_all(&input_dir).unwrap();
        fs::write(input_dir.join("good.txt"), "First.\n\nSecond.").unwrap();
        fs::write(input_dir.join("bad.txt"), "Body.").unwrap();
        // Broken sidecar makes bad.txt fail while good.txt still lands.
        fs::write(input_dir.join("bad.meta.json"), "{not json").unwrap();
        fs::write(input_dir.join("ignored.md"), "not an input").unwrap();

        let summary = process_dir(&input_dir, &out).unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.chunks, 2);

        assert!(process_dir(&dir.path().join("missing"), &out).is_err());
    }
}
