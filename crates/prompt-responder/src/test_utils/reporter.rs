//! Transcript reporting on test failure.

use std::thread;

use crate::session::SessionOutput;
use crate::transcript::Transcript;

/// Guard that prints the last recorded transcript if the test panics.
///
/// ```ignore
/// let mut report = TranscriptReporter::new("model scaffold");
/// let output = session.run().await?;
/// report.record_output(&output);
/// assert!(sandbox.exists("common/models/a-model.json"));
/// ```
#[derive(Debug, Default)]
pub struct TranscriptReporter {
    label: String,
    rendered: Option<String>,
}

impl TranscriptReporter {
    /// Create a reporter labelled for the failure message.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rendered: None,
        }
    }

    /// Keep a transcript to print on failure.
    pub fn record(&mut self, transcript: &Transcript) {
        self.rendered = Some(transcript.render());
    }

    /// Keep the transcript and streams of a finished session.
    pub fn record_output(&mut self, output: &SessionOutput) {
        self.rendered = Some(format!(
            "{}--- stdout ---\n{}\n--- stderr ---\n{}",
            output.transcript.render(),
            output.stdout,
            output.stderr
        ));
    }

    /// Keep arbitrary text, such as an error message.
    pub fn record_text(&mut self, text: impl Into<String>) {
        self.rendered = Some(text.into());
    }

    /// The text that would be printed.
    #[must_use]
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }
}

impl Drop for TranscriptReporter {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        if let Some(rendered) = &self.rendered {
            eprintln!("=== transcript: {} ===\n{rendered}", self.label);
        }
    }
}
