//! Streaming extraction API: emit pages as the caller consumes them.
//!
//! Large documents take a while to walk. A stream lets callers drive a
//! progress display or hand pages downstream one at a time instead of
//! buffering the entire document. Unlike [`crate::ingest::ingest`], which
//! returns only after every page has been read, [`extract_stream`] yields
//! [`ExtractedPage`](crate::ExtractedPage) items in strict page order.
//!
//! A stream that yields an `Err` ends right after it. Pages received before
//! the error belong to a half-extracted document and must not be used as if
//! they were the whole; [`crate::ingest::collect_pages`] enforces this.

use crate::config::PipelineConfig;
use crate::error::ExtractionError;
use crate::pipeline::extract::{self, PageSource, PageStream};
use crate::pipeline::input::SourceDocument;
use std::path::Path;
use tracing::info;

/// Extract a PDF held in memory, streaming pages in order.
///
/// # Returns
/// - `Ok(PageStream)`: a stream of `Result<ExtractedPage, ExtractionError>`
/// - `Err(ExtractionError)`: the document failed validation (wrong media
///   type, not a PDF); nothing was spawned
///
/// # Example
/// ```rust,no_run
/// use docsift::{extract_stream, PipelineConfig, SourceDocument};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = SourceDocument::from_path("document.pdf").await?;
/// let mut pages = extract_stream(&doc, &PipelineConfig::default()).await?;
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     println!("Page {}: {} chars", page.index, page.text.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_stream(
    doc: &SourceDocument,
    config: &PipelineConfig,
) -> Result<PageStream, ExtractionError> {
    doc.validate()?;
    info!("Starting streaming extraction ({} bytes)", doc.len());
    Ok(extract::spawn_pdfium(
        doc.shared_bytes(),
        config.password.clone(),
        config.pdfium_lib_path.clone(),
        config.progress_callback.clone(),
    ))
}

/// Read a local PDF and stream its pages.
pub async fn extract_stream_from_path(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PageStream, ExtractionError> {
    let doc = SourceDocument::from_path(path).await?;
    extract_stream(&doc, config).await
}

/// Stream the pages of any [`PageSource`] through the same ordered producer.
pub async fn extract_stream_from_source<S>(source: S, config: &PipelineConfig) -> PageStream
where
    S: PageSource + Send + 'static,
{
    extract::spawn_source(source, config.progress_callback.clone())
}
