//! Input validation: wrap caller-supplied bytes as a [`SourceDocument`].
//!
//! The upload boundary already filters by media type, but the extractor
//! re-checks both the declared type and the `%PDF` magic bytes so callers
//! get a meaningful [`ExtractionError`] rather than a pdfium crash.

use crate::config::PDF_MEDIA_TYPE;
use crate::error::ExtractionError;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Immutable binary document plus its declared media type.
///
/// The bytes are reference-counted so the extraction thread can hold them
/// without copying the whole document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Arc<[u8]>,
    media_type: String,
}

impl SourceDocument {
    /// Wrap in-memory content. Performs no validation; see [`Self::validate`].
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            media_type: media_type.into(),
        }
    }

    /// Convenience constructor for PDF content.
    pub fn pdf(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, PDF_MEDIA_TYPE)
    }

    /// Read a local file as a PDF document.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ExtractionError::PermissionDenied {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::NotFound => ExtractionError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ExtractionError::Internal(format!("reading {}: {e}", path.display())),
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::pdf(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the declared media type and the PDF magic bytes.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        let declared = self
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if !declared.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            return Err(ExtractionError::UnsupportedMediaType {
                media_type: self.media_type.clone(),
            });
        }

        if !self.bytes.starts_with(PDF_MAGIC) {
            let magic = self.bytes.iter().take(PDF_MAGIC.len()).copied().collect();
            return Err(ExtractionError::NotAPdf { magic });
        }

        Ok(())
    }
}
