//! Chunk buffering and prompt completeness detection.
//!
//! A full-screen prompt library never says "this prompt is done". It writes
//! text and cursor codes across many small writes, and overwrites the
//! previous prompt line with control codes before printing the final answer
//! line. [`PendingBuffer`] accumulates those fragments and decides, one
//! fragment at a time, whether it now holds a settled block of text:
//!
//! - a buffer ending inside an escape sequence waits for more data;
//! - a buffer that is nothing but control codes and whitespace is dropped;
//! - a buffer with no control codes left is settled as a whole;
//! - a buffer mixing control codes and text settles once it has at least two
//!   lines, dropping the first line if that line still carries a control
//!   sequence (the overwritten redraw).

use std::borrow::Cow;

use crate::filter::{
    contains_control_sequence, filter_insignificant, has_incomplete_escape,
    strip_control_sequences, strip_garbage,
};
use crate::transcript::Transcript;

/// Terminal output that has not yet settled into a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingBuffer {
    pending: String,
}

impl PendingBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and extract a settled prompt, if there is one.
    ///
    /// The returned prompt is whitespace-collapsed and trimmed. Discarded
    /// redraw lines and the kept remainder are logged to `transcript`.
    pub fn push(&mut self, fragment: &str, transcript: &mut Transcript) -> Option<String> {
        self.pending.push_str(fragment);
        // Filtering the whole buffer catches sequences split across reads
        if let Cow::Owned(filtered) = filter_insignificant(&self.pending) {
            self.pending = filtered;
        }

        if has_incomplete_escape(&self.pending) {
            return None;
        }

        if strip_control_sequences(&self.pending).trim().is_empty() {
            self.pending.clear();
            return None;
        }

        if !contains_control_sequence(&self.pending) {
            // Non-CSI escapes such as `ESC(B` never mark a repaint, but must
            // not reach the classifier either
            let block = std::mem::take(&mut self.pending);
            return normalize_prompt(&strip_garbage(&block));
        }

        let block = {
            let lines: Vec<&str> = self.pending.split('\n').collect();
            if lines.len() < 2 {
                return None;
            }

            let kept = if contains_control_sequence(lines[0]) {
                transcript.discarded(lines[0]);
                &lines[1..]
            } else {
                &lines[..]
            };
            kept.join("\n")
        };
        self.pending.clear();
        transcript.remains(&block);

        // Later lines may still carry codes (a colored answer echo, say)
        normalize_prompt(&strip_garbage(&block))
    }

    /// The text currently held back.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Check if nothing is held back.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop anything held back.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Collapse runs of whitespace to single spaces and trim.
///
/// Returns `None` when nothing is left.
#[must_use]
pub fn normalize_prompt(block: &str) -> Option<String> {
    let normalized = block.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
