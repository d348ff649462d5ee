//! Responding to settled prompts.
//!
//! [`Responder`] ties the pipeline together for one session: each decoded
//! stdout chunk goes through the [`PendingBuffer`], a settled prompt is
//! classified by the [`RuleTable`], and the matching response is written to
//! the child's standard input immediately, in detection order.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::answers::Answers;
use crate::config::LineEnding;
use crate::error::{ResponderError, Result};
use crate::rules::{Response, RuleTable};
use crate::settle::PendingBuffer;
use crate::transcript::Transcript;

/// Outcome of feeding one chunk to the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Nothing settled yet.
    Pending,
    /// A prompt settled but no rule recognized it; nothing was sent.
    Ignored {
        /// The normalized prompt.
        prompt: String,
    },
    /// A prompt settled and a response was written.
    Responded {
        /// The normalized prompt.
        prompt: String,
        /// Position of the matching rule in the table.
        rule_index: usize,
        /// Exact text written to the child, line terminator included.
        sent: String,
    },
}

impl Detection {
    /// Check if a response was written.
    #[must_use]
    pub const fn is_responded(&self) -> bool {
        matches!(self, Self::Responded { .. })
    }

    /// The settled prompt, if any.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Ignored { prompt } | Self::Responded { prompt, .. } => Some(prompt),
        }
    }
}

/// Per-session prompt interpreter writing to the child's input.
#[derive(Debug)]
pub struct Responder<W> {
    input: W,
    answers: Answers,
    rules: Arc<RuleTable>,
    buffer: PendingBuffer,
    transcript: Transcript,
    line_ending: LineEnding,
}

impl<W: AsyncWrite + Unpin> Responder<W> {
    /// Create a responder writing to `input`.
    pub fn new(input: W, answers: Answers, rules: Arc<RuleTable>) -> Self {
        Self {
            input,
            answers,
            rules,
            buffer: PendingBuffer::new(),
            transcript: Transcript::new(),
            line_ending: LineEnding::default(),
        }
    }

    /// Set the line terminator sent after answers.
    #[must_use]
    pub const fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Feed a decoded stdout chunk, responding if a prompt settles.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError::MissingAnswer`] when the matching rule names
    /// an answer the session was not given, and an I/O error when writing to
    /// the child fails.
    pub async fn detect_prompt_and_respond(&mut self, chunk: &str) -> Result<Detection> {
        let Some(prompt) = self.buffer.push(chunk, &mut self.transcript) else {
            return Ok(Detection::Pending);
        };

        let Some((rule_index, rule)) = self.rules.classify(&prompt) else {
            self.transcript.ignored(&prompt);
            return Ok(Detection::Ignored { prompt });
        };
        let response = rule.response().clone();
        self.transcript.prompt(&prompt);

        let sent = match response {
            Response::NamedAnswer(key) => {
                let Some(value) = self.answers.get(&key) else {
                    tracing::warn!(key = %key, prompt = %prompt, "No answer for prompt");
                    return Err(ResponderError::missing_answer(
                        key,
                        prompt,
                        self.transcript.render(),
                    ));
                };
                let value = value.to_string();
                self.transcript.sent(&key, &value);
                value + self.line_ending.as_str()
            }
            Response::AcceptDefault => {
                self.transcript.default_selected();
                self.line_ending.as_str().to_string()
            }
        };

        self.write(sent.as_bytes()).await?;

        Ok(Detection::Responded {
            prompt,
            rule_index,
            sent,
        })
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.input
            .write_all(bytes)
            .await
            .map_err(|e| ResponderError::io_context("writing to child stdin", e))?;
        self.input
            .flush()
            .await
            .map_err(|e| ResponderError::io_context("flushing child stdin", e))
    }

    /// The transcript so far.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Text held back waiting for a prompt to settle.
    #[must_use]
    pub fn pending(&self) -> &str {
        self.buffer.pending()
    }

    /// The answers this responder was given.
    #[must_use]
    pub const fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Mutable access to the input writer.
    pub fn input_mut(&mut self) -> &mut W {
        &mut self.input
    }

    /// Split into the input writer and the transcript.
    #[must_use]
    pub fn into_parts(self) -> (W, Transcript) {
        (self.input, self.transcript)
    }
}
