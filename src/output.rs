//! Result types of the upload path.

use crate::pipeline::extract::ExtractedPage;
use crate::pipeline::normalize::NormalizedDocument;
use serde::{Deserialize, Serialize};

/// Everything produced by one successful ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutput {
    /// Per-page text, `index` 1..=N in source order.
    pub pages: Vec<ExtractedPage>,
    /// Canonical paragraphs derived from the joined pages.
    pub document: NormalizedDocument,
    /// Paragraphs re-joined with blank lines; the string handed to the
    /// document store.
    pub text: String,
    pub stats: IngestStats,
}

/// Counters and timings for one ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub total_pages: usize,
    /// Pages whose extracted text was blank.
    pub empty_pages: usize,
    pub paragraphs: usize,
    pub text_bytes: usize,
    pub extraction_duration_ms: u64,
}
