//! Configuration for the upload and search pipelines.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. Callers set only what they care about and
//! rely on the defaults for the rest; `build()` rejects values that would
//! make a stage misbehave (a zero-length reveal interval would spin, a
//! zero-capacity history would never record anything).

use crate::error::ConfigError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Media type accepted by the extractor.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Configuration shared by the upload path and the search path.
///
/// # Example
/// ```rust
/// use docsift::{PageSeparator, PipelineConfig};
/// use std::time::Duration;
///
/// let config = PipelineConfig::builder()
///     .page_separator(PageSeparator::PageHeading)
///     .reveal_interval(Duration::from_millis(10))
///     .build()
///     .unwrap();
/// assert_eq!(config.history_capacity, 10);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit path to a pdfium shared library. Default: None.
    ///
    /// When unset, `PDFIUM_LIB_PATH` is consulted, then the working
    /// directory, then the system library search path.
    pub pdfium_lib_path: Option<PathBuf>,

    /// How page texts are joined before normalisation. Default: blank line.
    pub page_separator: PageSeparator,

    /// Delay between two reveal ticks (one character each). Default: 20 ms.
    pub reveal_interval: Duration,

    /// Maximum number of remembered search queries. Default: 10.
    pub history_capacity: usize,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            password: None,
            pdfium_lib_path: None,
            page_separator: PageSeparator::default(),
            reveal_interval: Duration::from_millis(20),
            history_capacity: 10,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("page_separator", &self.page_separator)
            .field("reveal_interval", &self.reveal_interval)
            .field("history_capacity", &self.history_capacity)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn reveal_interval(mut self, interval: Duration) -> Self {
        self.config.reveal_interval = interval;
        self
    }

    pub fn history_capacity(mut self, n: usize) -> Self {
        self.config.history_capacity = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let c = &self.config;
        if c.reveal_interval.is_zero() {
            return Err(ConfigError::ZeroRevealInterval);
        }
        if c.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages when joining them into one text.
///
/// Every variant keeps page boundaries on blank lines, so the normaliser
/// never merges the last paragraph of one page with the first of the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Pages joined with a single blank line. (default)
    #[default]
    Blank,
    /// Each page preceded by a `# Page N` heading paragraph.
    PageHeading,
    /// A `---` paragraph between pages.
    HorizontalRule,
    /// Custom string inserted as its own paragraph between pages.
    Custom(String),
}

impl PageSeparator {
    /// Text placed before page `page_num` (1-indexed).
    ///
    /// Page 1 only receives a prefix for [`PageSeparator::PageHeading`].
    pub fn render(&self, page_num: usize) -> String {
        match (self, page_num) {
            (PageSeparator::PageHeading, 1) => "# Page 1\n\n".to_string(),
            (PageSeparator::PageHeading, n) => format!("\n\n# Page {n}\n\n"),
            (_, 1) => String::new(),
            (PageSeparator::Blank, _) => "\n\n".to_string(),
            (PageSeparator::HorizontalRule, _) => "\n\n---\n\n".to_string(),
            (PageSeparator::Custom(s), _) => format!("\n\n{s}\n\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PipelineConfig::default();
        assert_eq!(c.reveal_interval, Duration::from_millis(20));
        assert_eq!(c.history_capacity, 10);
        assert_eq!(c.page_separator, PageSeparator::Blank);
        assert!(c.password.is_none());
    }

    #[test]
    fn builder_rejects_zero_interval() {
        let err = PipelineConfig::builder()
            .reveal_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroRevealInterval);
    }

    #[test]
    fn builder_rejects_zero_history() {
        let err = PipelineConfig::builder()
            .history_capacity(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroHistoryCapacity);
    }

    #[test]
    fn debug_redacts_password() {
        let c = PipelineConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn separator_render() {
        assert_eq!(PageSeparator::Blank.render(1), "");
        assert_eq!(PageSeparator::Blank.render(2), "\n\n");
        assert_eq!(PageSeparator::PageHeading.render(1), "# Page 1\n\n");
        assert_eq!(PageSeparator::PageHeading.render(3), "\n\n# Page 3\n\n");
        assert_eq!(PageSeparator::HorizontalRule.render(2), "\n\n---\n\n");
        assert_eq!(
            PageSeparator::Custom("***".into()).render(2),
            "\n\n***\n\n"
        );
    }
}
