//! Search path: from an untyped backend answer to rendered markup.
//!
//! ```text
//! SearchReply ──▶ payload ──▶ reveal ──▶ markup ──▶ html
//!  (serde)       (resolve)   (ticking)   (tree)    (escaped)
//! ```
//!
//! 1. [`payload`]: resolve whatever the backend sent into one string; never
//!    fails
//! 2. [`reveal`]: disclose that string one character per tick; a newer
//!    answer cancels the old reveal
//! 3. [`markup`]: parse the visible prefix into headings, lists and
//!    paragraphs of inline runs
//! 4. [`html`]: escaped HTML for the tree
//!
//! [`search`] ties these together for one search view.

pub mod html;
pub mod markup;
pub mod payload;
pub mod reveal;
pub mod search;

pub use html::{render_html, to_html};
pub use markup::{parse_inline, render, InlineRun, MarkupNode};
pub use payload::{resolve, BackendPayload};
pub use reveal::{AnswerSlot, RevealHandle, RevealPhase, RevealState};
pub use search::{Applied, SearchHistory, SearchReply, SearchResult, SearchSession, SearchTicket};
