//! Eager (full-document) upload path.
//!
//! Waits for every page, then joins and normalises them. Use
//! [`crate::stream::extract_stream`] instead when pages should be handled
//! progressively.
//!
//! ```text
//! SourceDocument ──▶ extract ──▶ join_pages ──▶ normalize ──▶ IngestOutput
//!   (validate)      (ordered)    (separator)   (paragraphs)
//! ```

use crate::config::PipelineConfig;
use crate::error::ExtractionError;
use crate::output::{IngestOutput, IngestStats};
use crate::pipeline::extract::{ExtractedPage, PageSource, PageStream};
use crate::pipeline::input::SourceDocument;
use crate::pipeline::normalize::{join_pages, normalize};
use crate::stream::{extract_stream, extract_stream_from_source};
use futures::StreamExt;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Extract and normalise a PDF held in memory.
///
/// # Errors
/// Any [`ExtractionError`]. No partial output is ever returned: if page 7
/// of 10 fails, pages 1–6 are dropped along with the attempt.
pub async fn ingest(
    doc: &SourceDocument,
    config: &PipelineConfig,
) -> Result<IngestOutput, ExtractionError> {
    let start = Instant::now();
    let pages = collect_pages(extract_stream(doc, config).await?).await?;
    Ok(assemble(pages, config, start))
}

/// Read, extract and normalise a local PDF.
pub async fn ingest_file(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<IngestOutput, ExtractionError> {
    let doc = SourceDocument::from_path(path).await?;
    ingest(&doc, config).await
}

/// Extract and normalise any [`PageSource`].
pub async fn ingest_source<S>(
    source: S,
    config: &PipelineConfig,
) -> Result<IngestOutput, ExtractionError>
where
    S: PageSource + Send + 'static,
{
    let start = Instant::now();
    let pages = collect_pages(extract_stream_from_source(source, config).await).await?;
    Ok(assemble(pages, config, start))
}

/// Synchronous wrapper around [`ingest`].
///
/// Creates a temporary tokio runtime internally.
pub fn ingest_sync(
    doc: &SourceDocument,
    config: &PipelineConfig,
) -> Result<IngestOutput, ExtractionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(ingest(doc, config))
}

/// Drain a page stream, all or nothing.
///
/// Returns every page in order, or the first error with all pages received
/// so far discarded.
pub async fn collect_pages(mut stream: PageStream) -> Result<Vec<ExtractedPage>, ExtractionError> {
    let mut pages = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(page) => pages.push(page),
            Err(e) => {
                warn!("Discarding {} extracted pages after failure", pages.len());
                return Err(e);
            }
        }
    }
    Ok(pages)
}

fn assemble(pages: Vec<ExtractedPage>, config: &PipelineConfig, start: Instant) -> IngestOutput {
    let joined = join_pages(&pages, &config.page_separator);
    let document = normalize(&joined);
    let text = document.to_text();

    let stats = IngestStats {
        total_pages: pages.len(),
        empty_pages: pages.iter().filter(|p| p.text.trim().is_empty()).count(),
        paragraphs: document.len(),
        text_bytes: text.len(),
        extraction_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Ingest complete: {} pages, {} paragraphs, {}ms",
        stats.total_pages, stats.paragraphs, stats.extraction_duration_ms
    );

    IngestOutput {
        pages,
        document,
        text,
        stats,
    }
}
