//! Upload path stages.
//!
//! Each submodule implements exactly one transformation step and is tested
//! on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize
//! (bytes)   (pdfium)    (paragraphs)
//! ```
//!
//! 1. [`input`]: hold the uploaded bytes and reject anything that is not
//!    a PDF before pdfium sees it
//! 2. [`extract`]: walk pages in order on the blocking pool, yielding one
//!    [`extract::ExtractedPage`] at a time
//! 3. [`normalize`]: join pages and split the result into canonical
//!    paragraphs

pub mod extract;
pub mod input;
pub mod normalize;
