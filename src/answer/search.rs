//! Search replies, query history and the sequence-fenced search session.
//!
//! A search is fire-and-forget from the caller's point of view: the query is
//! sent, and some time later a reply comes back. Replies can arrive out of
//! order. [`SearchSession`] hands out a [`SearchTicket`] per query and only
//! lets a reply replace what is on screen if its ticket is newer than the one
//! already displayed.

use super::payload::BackendPayload;
use super::reveal::{AnswerSlot, RevealState};
use crate::config::PipelineConfig;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};

/// One retrieved chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub document_id: i64,
    pub document_name: String,
    pub chunk_id: i64,
    pub content: String,
    /// Cosine similarity in `0.0..=1.0`.
    pub similarity: f64,
}

impl SearchResult {
    /// Similarity as a whole percentage, e.g. `0.876` → `88`.
    pub fn match_percent(&self) -> u32 {
        (self.similarity * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// The retrieval backend's reply to one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReply {
    /// Missing or non-array `results` reads as no results.
    #[serde(default, deserialize_with = "results_or_empty")]
    pub results: Vec<SearchResult>,
    /// The synthesised answer in whatever shape the backend produced it.
    #[serde(default)]
    pub synthesized_response: Option<Value>,
    #[serde(default)]
    pub warning: Option<String>,
}

impl SearchReply {
    /// Parse a reply body.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// The synthesised answer resolved for display; empty when absent.
    pub fn answer(&self) -> String {
        match &self.synthesized_response {
            None | Some(Value::Null) => String::new(),
            Some(value) => BackendPayload::from_value(value.clone()).resolve(),
        }
    }
}

fn results_or_empty<'de, D>(deserializer: D) -> Result<Vec<SearchResult>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        other => {
            debug!("Reply `results` is not an array ({}); treating as empty", other);
            Ok(Vec::new())
        }
    }
}

/// Recent queries, most recent first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHistory {
    entries: Vec<String>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl SearchHistory {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// History with `query` recorded.
    ///
    /// Blank queries and queries already present leave it unchanged.
    /// Otherwise the query goes first and the oldest entries beyond capacity
    /// fall off.
    #[must_use]
    pub fn record(&self, query: &str) -> Self {
        if query.trim().is_empty() || self.entries.iter().any(|q| q == query) {
            return self.clone();
        }
        let entries = std::iter::once(query.to_string())
            .chain(self.entries.iter().cloned())
            .take(self.capacity)
            .collect();
        Self {
            entries,
            capacity: self.capacity,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifies one issued query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Outcome of [`SearchSession::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The reply replaced what was on screen.
    Displayed,
    /// A newer reply is already on screen; this one was dropped.
    Stale,
}

/// State behind one search view: results, answer slot and history.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug)]
pub struct SearchSession {
    next_seq: u64,
    displayed_seq: Option<u64>,
    results: Vec<SearchResult>,
    warning: Option<String>,
    history: SearchHistory,
    slot: AnswerSlot,
}

impl SearchSession {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            next_seq: 0,
            displayed_seq: None,
            results: Vec::new(),
            warning: None,
            history: SearchHistory::with_capacity(config.history_capacity),
            slot: AnswerSlot::from_config(config),
        }
    }

    /// Issue a ticket for a query about to be sent.
    pub fn begin(&mut self, query: impl Into<String>) -> SearchTicket {
        self.next_seq += 1;
        SearchTicket {
            seq: self.next_seq,
            query: query.into(),
        }
    }

    /// Apply the reply for `ticket`, unless a newer one is already shown.
    pub fn apply(&mut self, ticket: &SearchTicket, reply: SearchReply) -> Applied {
        if self.displayed_seq.is_some_and(|shown| ticket.seq <= shown) {
            debug!(
                "Dropping stale reply for search #{} (showing #{})",
                ticket.seq,
                self.displayed_seq.unwrap_or_default()
            );
            return Applied::Stale;
        }

        info!(
            "Search #{} returned {} results",
            ticket.seq,
            reply.results.len()
        );
        self.displayed_seq = Some(ticket.seq);
        let answer = reply.answer();
        self.results = reply.results;
        self.warning = reply.warning;
        self.slot.present(answer);
        self.history = self.history.record(&ticket.query);
        Applied::Displayed
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// The slot the current answer is revealed into.
    pub fn answer(&self) -> &AnswerSlot {
        &self.slot
    }

    /// Follow the answer as it is revealed.
    pub fn subscribe_answer(&self) -> watch::Receiver<RevealState> {
        self.slot.subscribe()
    }

    /// Show the whole answer now.
    pub fn skip_reveal(&mut self) {
        self.slot.skip_to_end();
    }
}
