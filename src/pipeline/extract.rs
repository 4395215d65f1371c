//! Page-ordered text extraction.
//!
//! ## Why a producer thread and a channel of one?
//!
//! pdfium keeps thread-local state and is not safe to drive from async
//! code, so the document is opened and walked inside `spawn_blocking`. The
//! producer hands each finished page over a bounded channel of capacity 1:
//! `blocking_send` parks the thread until the consumer has taken the
//! previous page. Pages therefore arrive strictly in source order, the
//! producer never runs more than one page ahead of the caller, and peak
//! memory stays around one page of text regardless of document length.
//!
//! Dropping the returned stream closes the channel; the producer notices on
//! its next send and stops. There is no other cancellation.
//!
//! The text backend sits behind [`PageSource`] so the same producer drives
//! pdfium in production and in-memory documents in tests.

use crate::error::ExtractionError;
use crate::progress::ProgressCallback;
use futures::Stream;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

/// Text of one physical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-indexed page number, contiguous and in source order.
    pub index: usize,
    pub text: String,
}

/// A boxed, lazy stream of extracted pages.
///
/// The stream ends after the last page or right after the first `Err`.
/// Consumers that collect pages must discard everything on `Err`; see
/// [`crate::ingest::collect_pages`].
pub type PageStream = Pin<Box<dyn Stream<Item = Result<ExtractedPage, ExtractionError>> + Send>>;

/// A paginated document whose pages can be read one at a time.
pub trait PageSource {
    /// Number of physical pages.
    fn page_count(&self) -> usize;

    /// Text fragments of the page at 0-based `index`, in reported order.
    fn page_fragments(&self, index: usize) -> Result<Vec<String>, ExtractionError>;
}

/// Join a page's fragments, as reported, with single spaces.
///
/// Fragments are not trimmed; whitespace cleanup is the normaliser's job.
pub fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spawn the producer for an arbitrary [`PageSource`].
///
/// Must be called from within a Tokio runtime.
pub fn spawn_source<S>(source: S, progress: Option<ProgressCallback>) -> PageStream
where
    S: PageSource + Send + 'static,
{
    spawn_producer(move |tx| produce_pages(&source, tx, progress.as_ref()))
}

/// Spawn the producer for a PDF held in memory.
///
/// The document is opened on the blocking pool; load failures (corrupt
/// file, missing password, no pdfium library) arrive as the stream's only
/// item. Must be called from within a Tokio runtime.
pub(crate) fn spawn_pdfium(
    bytes: Arc<[u8]>,
    password: Option<String>,
    lib_path: Option<PathBuf>,
    progress: Option<ProgressCallback>,
) -> PageStream {
    spawn_producer(move |tx| {
        let opened = bind_pdfium(lib_path.as_deref()).and_then(|pdfium| {
            extract_with_pdfium(&pdfium, &bytes, password.as_deref(), tx, progress.as_ref())
        });
        if let Err(e) = opened {
            warn!("Failed to open document: {}", e);
            if let Some(cb) = progress.as_ref() {
                cb.on_extraction_error(None, &e.to_string());
            }
            let _ = tx.blocking_send(Err(e));
        }
    })
}

type PageSender = mpsc::Sender<Result<ExtractedPage, ExtractionError>>;

/// Run `produce` on the blocking pool and stream what it sends.
///
/// A panicking producer ends the stream with [`ExtractionError::Internal`]
/// instead of a clean end, so a crash never reads as a shorter document.
fn spawn_producer<F>(produce: F) -> PageStream
where
    F: FnOnce(&PageSender) + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let panic_tx = tx.clone();
    let worker = tokio::task::spawn_blocking(move || produce(&tx));
    tokio::spawn(async move {
        if let Err(e) = worker.await {
            if e.is_panic() {
                warn!("Extraction thread panicked");
                let _ = panic_tx
                    .send(Err(ExtractionError::Internal(
                        "extraction thread panicked".to_string(),
                    )))
                    .await;
            }
        }
    });
    Box::pin(ReceiverStream::new(rx))
}

/// Walk every page of `source` in order, sending each as it completes.
fn produce_pages(source: &dyn PageSource, tx: &PageSender, progress: Option<&ProgressCallback>) {
    let total = source.page_count();
    info!("Extracting {} pages", total);
    if let Some(cb) = progress {
        cb.on_extraction_start(total);
    }

    for idx in 0..total {
        let page_num = idx + 1;
        let fragments = match source.page_fragments(idx) {
            Ok(f) => f,
            Err(e) => {
                warn!("Extraction failed on page {}: {}", page_num, e);
                if let Some(cb) = progress {
                    cb.on_extraction_error(Some(page_num), &e.to_string());
                }
                let _ = tx.blocking_send(Err(e));
                return;
            }
        };

        let page = ExtractedPage {
            index: page_num,
            text: join_fragments(&fragments),
        };
        debug!(
            "Extracted page {}/{} ({} fragments, {} bytes)",
            page_num,
            total,
            fragments.len(),
            page.text.len()
        );
        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total, page.text.len());
        }

        if tx.blocking_send(Ok(page)).is_err() {
            debug!("Page consumer went away after page {}; stopping", page_num);
            return;
        }
    }

    if let Some(cb) = progress {
        cb.on_extraction_complete(total);
    }
}

// ── pdfium backend ───────────────────────────────────────────────────────

struct PdfiumPages<'a, 'b> {
    document: &'a PdfDocument<'b>,
}

impl PageSource for PdfiumPages<'_, '_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_fragments(&self, index: usize) -> Result<Vec<String>, ExtractionError> {
        let page_err = |e: PdfiumError| ExtractionError::PageReadFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self
            .document
            .pages()
            .get(index as PdfPageIndex)
            .map_err(page_err)?;
        let text = page.text().map_err(page_err)?;
        let fragments = text.segments().iter().map(|segment| segment.text()).collect();
        Ok(fragments)
    }
}

fn extract_with_pdfium(
    pdfium: &Pdfium,
    bytes: &[u8],
    password: Option<&str>,
    tx: &PageSender,
    progress: Option<&ProgressCallback>,
) -> Result<(), ExtractionError> {
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| map_load_error(e, password.is_some()))?;
    produce_pages(&PdfiumPages { document: &document }, tx, progress);
    Ok(())
}

fn map_load_error(e: PdfiumError, had_password: bool) -> ExtractionError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            ExtractionError::WrongPassword
        } else {
            ExtractionError::PasswordRequired
        }
    } else {
        ExtractionError::CorruptDocument { detail: err_str }
    }
}

/// Bind to a pdfium library, from most-specific to least-specific:
/// explicit path, `PDFIUM_LIB_PATH`, working directory, system library.
fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, ExtractionError> {
    let configured = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match configured {
        Some(path) => {
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path)
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    };

    bindings
        .map(Pdfium::new)
        .map_err(|e| ExtractionError::PdfiumBindingFailed(e.to_string()))
}
