//! Typewriter reveal of a resolved answer.
//!
//! Two layers:
//!
//! * [`RevealState`]: the pure state machine (`Idle → Revealing →
//!   Complete`). No clocks, no tasks; every transition is a method call, so
//!   it is fully testable without a runtime.
//! * [`AnswerSlot`]: the single live reveal for one display slot. It owns
//!   the ticking task through a [`RevealHandle`] and publishes snapshots on
//!   a `tokio::sync::watch` channel for whoever renders the slot.
//!
//! ## Supersede and teardown
//!
//! Every [`RevealState::present`] bumps a generation counter. The ticking
//! task remembers the generation it was started for and applies a tick only
//! while the shared state still carries that generation; the check and the
//! increment happen under the watch channel's lock. A superseded task is
//! also aborted, but even if it gets one more poll before the abort lands,
//! it can no longer touch the new text.
//!
//! The task stops itself on `Complete`. [`AnswerSlot::present`] aborts the
//! previous task, [`AnswerSlot::stop`] aborts the current one, and dropping
//! the slot (view teardown) drops the handle, which aborts it too.

use crate::config::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Phase of a reveal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealPhase {
    /// Nothing has been presented yet.
    #[default]
    Idle,
    /// Characters are being disclosed one tick at a time.
    Revealing,
    /// The whole text is visible; no ticking.
    Complete,
}

/// Progress of revealing one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealState {
    full_text: String,
    /// Revealed length in characters.
    revealed_len: usize,
    /// Byte offset matching `revealed_len`.
    revealed_bytes: usize,
    phase: RevealPhase,
    generation: u64,
}

impl RevealState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `text` from the beginning, from any phase.
    ///
    /// Empty text goes straight to [`RevealPhase::Complete`]. Returns the new
    /// generation.
    pub fn present(&mut self, text: impl Into<String>) -> u64 {
        self.full_text = text.into();
        self.revealed_len = 0;
        self.revealed_bytes = 0;
        self.phase = if self.full_text.is_empty() {
            RevealPhase::Complete
        } else {
            RevealPhase::Revealing
        };
        self.generation += 1;
        self.generation
    }

    /// Reveal one more character. Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        if self.phase != RevealPhase::Revealing {
            return false;
        }
        let Some(next) = self.full_text[self.revealed_bytes..].chars().next() else {
            self.phase = RevealPhase::Complete;
            return true;
        };
        self.revealed_bytes += next.len_utf8();
        self.revealed_len += 1;
        if self.revealed_bytes == self.full_text.len() {
            self.phase = RevealPhase::Complete;
        }
        true
    }

    /// Reveal everything at once.
    pub fn finish(&mut self) {
        if self.phase == RevealPhase::Revealing {
            self.revealed_bytes = self.full_text.len();
            self.revealed_len = self.full_text.chars().count();
            self.phase = RevealPhase::Complete;
        }
    }

    /// The currently visible prefix.
    pub fn visible(&self) -> &str {
        &self.full_text[..self.revealed_bytes]
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn revealed_len(&self) -> usize {
        self.revealed_len
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RevealPhase::Complete
    }
}

/// Owner of one running reveal task. Dropping it aborts the task.
#[derive(Debug)]
pub struct RevealHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl RevealHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the task has stopped (completed or aborted).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop ticking now.
    pub fn stop(self) {
        // Drop aborts.
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The single display slot a search answer is revealed into.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug)]
pub struct AnswerSlot {
    state: Arc<watch::Sender<RevealState>>,
    interval: Duration,
    handle: Option<RevealHandle>,
}

impl AnswerSlot {
    /// Create an idle slot ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(RevealState::new());
        Self {
            state: Arc::new(tx),
            interval,
            handle: None,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.reveal_interval)
    }

    /// Receive a snapshot whenever the slot changes.
    pub fn subscribe(&self) -> watch::Receiver<RevealState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> RevealState {
        self.state.borrow().clone()
    }

    /// The currently visible prefix.
    pub fn visible(&self) -> String {
        self.state.borrow().visible().to_string()
    }

    /// Whether a reveal task is still ticking.
    pub fn is_ticking(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Replace whatever is in the slot with `text` and start revealing it.
    ///
    /// Any reveal in progress is stopped and discarded first.
    pub fn present(&mut self, text: impl Into<String>) {
        if let Some(previous) = self.handle.take() {
            debug!("Superseding reveal generation {}", previous.generation());
            previous.stop();
        }

        let mut generation = 0;
        let mut complete = false;
        self.state.send_modify(|s| {
            generation = s.present(text);
            complete = s.is_complete();
        });
        if complete {
            return;
        }

        let task = tokio::spawn(run_reveal(
            Arc::clone(&self.state),
            generation,
            self.interval,
        ));
        self.handle = Some(RevealHandle { generation, task });
    }

    /// Stop ticking, leaving the visible prefix as it is.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }

    /// Stop ticking and show the whole text.
    pub fn skip_to_end(&mut self) {
        self.stop();
        self.state.send_if_modified(|s| {
            let was_revealing = s.phase() == RevealPhase::Revealing;
            s.finish();
            was_revealing
        });
    }
}

async fn run_reveal(state: Arc<watch::Sender<RevealState>>, generation: u64, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // Skip first immediate tick

    loop {
        interval.tick().await;
        let mut done = false;
        state.send_if_modified(|s| {
            if s.generation() != generation {
                done = true;
                return false;
            }
            let advanced = s.tick();
            done = s.is_complete();
            advanced
        });
        if done {
            debug!("Reveal generation {} finished", generation);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let s = RevealState::new();
        assert_eq!(s.phase(), RevealPhase::Idle);
        assert_eq!(s.visible(), "");
    }

    #[test]
    fn ticks_to_completion() {
        let mut s = RevealState::new();
        s.present("hey");
        assert_eq!(s.phase(), RevealPhase::Revealing);
        assert!(s.tick());
        assert_eq!(s.visible(), "h");
        s.tick();
        s.tick();
        assert_eq!(s.revealed_len(), 3);
        assert_eq!(s.phase(), RevealPhase::Complete);
        assert!(!s.tick(), "no ticking after completion");
        assert_eq!(s.visible(), "hey");
    }

    #[test]
    fn empty_text_completes_immediately() {
        let mut s = RevealState::new();
        s.present("");
        assert_eq!(s.phase(), RevealPhase::Complete);
        assert_eq!(s.revealed_len(), 0);
        assert!(!s.tick());
    }

    #[test]
    fn multibyte_characters_reveal_whole() {
        let mut s = RevealState::new();
        s.present("ñé漢");
        s.tick();
        assert_eq!(s.visible(), "ñ");
        s.tick();
        assert_eq!(s.visible(), "ñé");
        s.tick();
        assert_eq!(s.revealed_len(), 3);
        assert!(s.is_complete());
    }

    #[test]
    fn present_resets_and_bumps_generation() {
        let mut s = RevealState::new();
        let g1 = s.present("first");
        s.tick();
        s.tick();
        let g2 = s.present("second");
        assert!(g2 > g1);
        assert_eq!(s.revealed_len(), 0);
        assert_eq!(s.full_text(), "second");
        assert_eq!(s.phase(), RevealPhase::Revealing);
    }

    #[test]
    fn finish_reveals_everything() {
        let mut s = RevealState::new();
        s.present("abc");
        s.finish();
        assert_eq!(s.visible(), "abc");
        assert_eq!(s.revealed_len(), 3);
        assert!(s.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn slot_reveals_one_char_per_tick() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        slot.present("abc");

        tokio::time::sleep(Duration::from_millis(45)).await;
        assert_eq!(slot.visible(), "ab");
        assert!(slot.is_ticking());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let snap = slot.snapshot();
        assert_eq!(snap.revealed_len(), 3);
        assert_eq!(snap.phase(), RevealPhase::Complete);
        assert!(!slot.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn new_answer_supersedes_in_flight_reveal() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        slot.present("abcdef");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(slot.visible(), "ab");

        slot.present("xy");
        let snap = slot.snapshot();
        assert_eq!(snap.revealed_len(), 0);
        assert_eq!(snap.full_text(), "xy");

        tokio::time::sleep(Duration::from_millis(200)).await;
        let snap = slot.snapshot();
        assert_eq!(snap.visible(), "xy");
        assert!(snap.is_complete());
        assert_eq!(snap.full_text(), "xy");
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_text_never_advances_the_new_one() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        slot.present("abcdef");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(slot.visible(), "ab");

        // The old task would have ticked at 60ms; only the new one may tick, at 70ms.
        slot.present("xyz");
        tokio::time::sleep(Duration::from_millis(25)).await;
        let snap = slot.snapshot();
        assert_eq!(snap.visible(), "x");
        assert_eq!(snap.revealed_len(), 1);
        assert_eq!(snap.phase(), RevealPhase::Revealing);
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_task_ignores_newer_generation() {
        let (tx, _keep) = watch::channel(RevealState::new());
        let state = Arc::new(tx);
        let mut old_generation = 0;
        state.send_modify(|s| old_generation = s.present("abc"));
        let task = tokio::spawn(run_reveal(
            Arc::clone(&state),
            old_generation,
            Duration::from_millis(20),
        ));

        // Swap in a new text without starting a task for it.
        state.send_modify(|s| {
            s.present("xyz");
        });
        let mut rx = state.subscribe();
        rx.borrow_and_update();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(task.is_finished());
        assert!(!rx.has_changed().unwrap());
        let snap = rx.borrow().clone();
        assert_eq!(snap.full_text(), "xyz");
        assert_eq!(snap.revealed_len(), 0);
        assert_eq!(snap.generation(), old_generation + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_answer_spawns_nothing() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        slot.present("");
        assert!(!slot.is_ticking());
        assert!(slot.snapshot().is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_freezes_prefix() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        slot.present("abcdef");
        tokio::time::sleep(Duration::from_millis(30)).await;
        slot.stop();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(slot.visible(), "a");
        assert_eq!(slot.snapshot().phase(), RevealPhase::Revealing);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_to_end_shows_everything() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        slot.present("abcdef");
        slot.skip_to_end();
        assert_eq!(slot.visible(), "abcdef");
        assert!(!slot.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_slot_stops_ticking() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        let rx = slot.subscribe();
        slot.present("abcdefghij");
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(slot);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let frozen = rx.borrow().revealed_len();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rx.borrow().revealed_len(), frozen);
        assert!(frozen < 10);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_progress() {
        let mut slot = AnswerSlot::new(Duration::from_millis(20));
        let mut rx = slot.subscribe();
        slot.present("ok");
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let snap = rx.borrow_and_update().clone();
            seen.push(snap.visible().to_string());
            if snap.is_complete() {
                break;
            }
        }
        assert_eq!(seen.last().map(String::as_str), Some("ok"));
    }
}
