//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events while the extractor walks the document.
//!
//! Events are emitted from the extraction thread (pdfium work runs on the
//! blocking pool), so implementations must be `Send + Sync`. Pages are
//! processed strictly in order, so `on_page_complete` is called with
//! `current = 1, 2, …, total` and never concurrently with itself.
//!
//! # Example
//!
//! ```rust
//! use docsift::{ExtractionProgressCallback, PipelineConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, current: usize, total: usize, text_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} extracted ({} bytes)", current, total, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extractor as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once the page count is known, before any page is read.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's text has been assembled.
    ///
    /// # Arguments
    /// * `current`: 1-indexed page number just completed
    /// * `total`: total pages in the document
    /// * `text_len`: byte length of the page text
    fn on_page_complete(&self, current: usize, total: usize, text_len: usize) {
        let _ = (current, total, text_len);
    }

    /// Called once when extraction fails; no further events follow.
    ///
    /// `page` is the 1-indexed page being read, or `None` when the document
    /// could not be opened at all.
    fn on_extraction_error(&self, page: Option<usize>, error: &str) {
        let _ = (page, error);
    }

    /// Called once after the last page completed successfully.
    fn on_extraction_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
