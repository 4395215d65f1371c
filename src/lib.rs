//! # docsift
//!
//! Text extraction and answer rendering for a document-search dashboard.
//!
//! The crate has two independent paths that share no state:
//!
//! ```text
//! Upload                                   Search
//!  │                                        │
//!  ├─ 1. Input      validate PDF bytes      ├─ 1. Payload  resolve untyped answer
//!  ├─ 2. Extract    pages via pdfium,       ├─ 2. Reveal   typewriter, cancellable
//!  │                in order (blocking)     ├─ 3. Markup   headings / lists / inline
//!  ├─ 3. Normalize  join + paragraphs       └─ 4. HTML     escaped fragment
//!  └─ 4. Output     text + per-page stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsift::{ingest_file, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = ingest_file("document.pdf", &PipelineConfig::default()).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} pages, {} paragraphs", output.stats.total_pages, output.stats.paragraphs);
//!     Ok(())
//! }
//! ```
//!
//! Rendering an answer needs no runtime:
//!
//! ```rust
//! use docsift::answer::{render_html, resolve};
//!
//! let text = resolve("{'result': '**Found** it'}");
//! assert_eq!(render_html(&text), "<p><strong>Found</strong> it</p>");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsift` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docsift = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Extraction binds the pdfium shared library at runtime. It is looked up at
//! [`PipelineConfig::pdfium_lib_path`], then `PDFIUM_LIB_PATH`, then the
//! working directory, then the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod answer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSeparator, PipelineConfig, PipelineConfigBuilder, PDF_MEDIA_TYPE};
pub use error::{ConfigError, ExtractionError};
pub use ingest::{collect_pages, ingest, ingest_file, ingest_source, ingest_sync};
pub use output::{IngestOutput, IngestStats};
pub use pipeline::extract::{join_fragments, ExtractedPage, PageSource, PageStream};
pub use pipeline::input::SourceDocument;
pub use pipeline::normalize::{join_pages, normalize, NormalizedDocument};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_stream, extract_stream_from_path, extract_stream_from_source};
