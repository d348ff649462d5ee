//! Error types for prompt-responder.
//!
//! Errors that end a session carry the diagnostic transcript collected so
//! far, so a failing test shows which prompts were seen and what was sent.

use std::time::Duration;

use thiserror::Error;

/// Maximum length of transcript content to display in error messages.
const MAX_TRANSCRIPT_DISPLAY: usize = 2000;

/// Lines to keep from the tail of a long transcript.
const TAIL_LINES: usize = 12;

/// Format a transcript for display, keeping the tail if it is long.
fn format_transcript_snippet(transcript: &str) -> String {
    if transcript.is_empty() {
        return "(empty transcript)".to_string();
    }

    let lines: Vec<&str> = transcript.lines().collect();
    let total_lines = lines.len();

    if transcript.len() <= MAX_TRANSCRIPT_DISPLAY || total_lines <= TAIL_LINES {
        return format!(
            "┌─ transcript ({total_lines} lines) ────────────────────\n│ {}\n└────────────────────────────────────────",
            lines.join("\n│ ")
        );
    }

    let tail = &lines[total_lines - TAIL_LINES..];
    let hidden = total_lines - tail.len();

    format!(
        "┌─ transcript ({total_lines} lines) ────────────────────\n│ ... ({hidden} lines hidden)\n│ {}\n└────────────────────────────────────────",
        tail.join("\n│ ")
    )
}

fn format_missing_answer(key: &str, prompt: &str, transcript: &str) -> String {
    let snippet = format_transcript_snippet(transcript);

    format!(
        "no answer for the prompt {key:?}\n\
         \n\
         Prompt: '{prompt}'\n\
         \n\
         {snippet}\n\
         \n\
         Tip: add an answer under {key:?} to the session's answers."
    )
}

fn format_timeout(duration: Duration, stdout: &str, transcript: &str) -> String {
    let snippet = format_transcript_snippet(transcript);
    let tail: String = stdout
        .lines()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n│ ");

    format!(
        "session did not finish within {duration:?}\n\
         \n\
         {snippet}\n\
         \n\
         Last stdout lines:\n│ {tail}\n\
         \n\
         Tip: the program is probably waiting on a prompt that no rule recognized.\n\
         Look for IGNORED lines in the transcript."
    )
}

/// The main error type for prompt-responder operations.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// Failed to spawn the process.
    #[error("failed to spawn process: {0}")]
    Spawn(#[from] SpawnError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A prompt asked for an answer the session was not given.
    #[error("{}", format_missing_answer(key, prompt, transcript))]
    MissingAnswer {
        /// The answer key the matching rule asked for.
        key: String,
        /// The normalized prompt text.
        prompt: String,
        /// Rendered transcript at the time of failure.
        transcript: String,
    },

    /// The session did not finish before its deadline.
    #[error("{}", format_timeout(*duration, stdout, transcript))]
    Timeout {
        /// The deadline that elapsed.
        duration: Duration,
        /// Stdout collected so far (control sequences stripped).
        stdout: String,
        /// Rendered transcript at the time of the timeout.
        transcript: String,
    },

    /// Invalid regex pattern in a rule.
    #[error("invalid rule pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors related to process spawning.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Command not found.
    #[error("command not found: {command}")]
    CommandNotFound {
        /// The command that was not found.
        command: String,
    },

    /// Permission denied.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be executed.
        path: String,
    },

    /// Working directory error.
    #[error("invalid working directory: {path}")]
    InvalidWorkingDir {
        /// The invalid working directory path.
        path: String,
    },

    /// No command was configured.
    #[error("no command configured")]
    NoCommand,

    /// A standard stream was not piped.
    #[error("child {stream} was not captured")]
    MissingPipe {
        /// Which stream (`stdin`, `stdout`, `stderr`).
        stream: &'static str,
    },

    /// General I/O error during spawn.
    #[error("I/O error during spawn: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for prompt-responder operations.
pub type Result<T> = std::result::Result<T, ResponderError>;

impl ResponderError {
    /// Create a missing answer error.
    pub fn missing_answer(
        key: impl Into<String>,
        prompt: impl Into<String>,
        transcript: impl Into<String>,
    ) -> Self {
        Self::MissingAnswer {
            key: key.into(),
            prompt: prompt.into(),
            transcript: transcript.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(
        duration: Duration,
        stdout: impl Into<String>,
        transcript: impl Into<String>,
    ) -> Self {
        Self::Timeout {
            duration,
            stdout: stdout.into(),
            transcript: transcript.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Check if this is a missing answer error.
    #[must_use]
    pub const fn is_missing_answer(&self) -> bool {
        matches!(self, Self::MissingAnswer { .. })
    }

    /// Check if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error came from writing to a child that closed its stdin.
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Io(e) | Self::IoWithContext { source: e, .. } => {
                e.kind() == std::io::ErrorKind::BrokenPipe
            }
            _ => false,
        }
    }

    /// Get the transcript attached to this error, if any.
    #[must_use]
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::MissingAnswer { transcript, .. } | Self::Timeout { transcript, .. } => {
                Some(transcript)
            }
            _ => None,
        }
    }
}

impl SpawnError {
    /// Classify an I/O error returned by process spawning.
    #[must_use]
    pub fn from_spawn_io(command: &str, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::CommandNotFound {
                command: command.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: command.to_string(),
            },
            _ => Self::Io(error),
        }
    }
}
