//! Diagnostic transcript of a session.
//!
//! The transcript is an append-only log of what the interpreter saw and did:
//! prompts it recognized, prompts it ignored, redraw lines it discarded and
//! the input it sent. It is attached to session errors and printed when a
//! test fails, so every line is human-readable with escape characters shown
//! as `<ESC>`. Each entry is also emitted as a `tracing` debug event.

use std::fmt;
use std::time::{Duration, Instant};

use crate::filter::escape_control;

/// Kind of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A settled prompt matched a rule.
    Prompt,
    /// A settled prompt matched no rule.
    Ignored,
    /// A redraw line dropped from a multi-line buffer.
    Discarded,
    /// The lines kept after a redraw line was examined.
    Remains,
    /// A named answer was written to the child.
    Sent,
    /// A bare line terminator was written to accept the highlighted choice.
    DefaultSelected,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Time since the transcript was created.
    pub elapsed: Duration,
    /// Entry kind.
    pub kind: EntryKind,
    /// Entry payload (prompt text, or `key: "value"` for sent answers).
    pub text: String,
}

impl TranscriptEntry {
    /// Render the entry as a single log line.
    #[must_use]
    pub fn line(&self) -> String {
        let text = escape_control(&self.text);
        match self.kind {
            EntryKind::Prompt => format!("PROMPT: ^{text}$"),
            EntryKind::Ignored => format!("IGNORED: ^{text}$"),
            EntryKind::Discarded => format!("DISCARDED ^{text}$"),
            EntryKind::Remains => format!("REMAINS ^{text}$"),
            EntryKind::Sent => format!(" -> Sending {text}"),
            EntryKind::DefaultSelected => " -> Selecting the default choice".to_string(),
        }
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())
    }
}

/// Append-only session transcript.
#[derive(Debug, Clone)]
pub struct Transcript {
    start: Instant,
    entries: Vec<TranscriptEntry>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            entries: Vec::new(),
        }
    }

    /// Record a prompt that matched a rule.
    pub fn prompt(&mut self, prompt: &str) {
        self.push(EntryKind::Prompt, prompt);
    }

    /// Record a prompt that matched no rule.
    pub fn ignored(&mut self, prompt: &str) {
        self.push(EntryKind::Ignored, prompt);
    }

    /// Record a discarded redraw line.
    pub fn discarded(&mut self, line: &str) {
        self.push(EntryKind::Discarded, line);
    }

    /// Record the block kept after examining a redraw.
    pub fn remains(&mut self, block: &str) {
        self.push(EntryKind::Remains, block);
    }

    /// Record a named answer written to the child.
    pub fn sent(&mut self, key: &str, value: &str) {
        let quoted = serde_json::Value::String(value.to_string());
        self.push(EntryKind::Sent, &format!("{key}: {quoted}"));
    }

    /// Record that the highlighted default was accepted.
    pub fn default_selected(&mut self) {
        self.push(EntryKind::DefaultSelected, "");
    }

    fn push(&mut self, kind: EntryKind, text: &str) {
        let entry = TranscriptEntry {
            elapsed: self.start.elapsed(),
            kind,
            text: text.to_string(),
        };
        tracing::debug!(
            target: "prompt_responder::transcript",
            elapsed_ms = entry.elapsed.as_millis(),
            "{}",
            entry.line()
        );
        self.entries.push(entry);
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Render every entry, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.line());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
