//! Error types for the docsift library.
//!
//! Only the upload path can fail. The search path (payload resolution,
//! reveal, markup rendering) degrades to literal text instead of erroring,
//! so it has no error type at all.
//!
//! * [`ExtractionError`]: **Fatal** to one upload attempt: the document
//!   could not be read, is not a PDF, or a page could not be extracted.
//!   There is never a partial result alongside it.
//!
//! * [`ConfigError`]: returned by
//!   [`crate::config::PipelineConfigBuilder::build`] when a knob is out of
//!   range.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors raised while turning a document into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The declared media type is not one the extractor handles.
    #[error("Unsupported media type '{media_type}': only application/pdf is accepted")]
    UnsupportedMediaType { media_type: String },

    /// The content was declared as a PDF but does not start with `%PDF`.
    #[error("Content is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptDocument { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    /// pdfium could not load a page or its text layer.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageReadFailed { page: usize, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library in the working\n\
directory, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. the extraction thread panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractionError {
    /// 1-indexed page the error is attributed to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            ExtractionError::PageReadFailed { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Builder validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: reveal interval must be non-zero")]
    ZeroRevealInterval,

    #[error("Invalid configuration: search history capacity must be at least 1")]
    ZeroHistoryCapacity,
}
