//! prompt-responder: scripted answers for interactive command-line tools
//!
//! This crate drives a prompt-based CLI (one built on a full-screen prompt
//! library) from a test: it spawns the program, watches its raw terminal
//! output, works out when a question has finished rendering, recognizes the
//! question through an ordered rule table and writes the scripted answer to
//! the program's standard input.
//!
//! # Pipeline
//!
//! - [`filter`] drops cursor show/hide and cursor-forward/back sequences
//! - [`settle`] buffers output until it holds a settled prompt
//! - [`rules`] classifies the prompt; first matching rule wins
//! - [`responder`] sends the named answer or accepts the default
//! - [`session`] owns the child process and collects its output
//!
//! # Example
//!
//! ```ignore
//! use prompt_responder::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let output = Session::builder("lb")
//!         .arg("model")
//!         .current_dir("/tmp/sandbox")
//!         .answer("modelName", "a-model")
//!         .answer("modelPlural", "")
//!         .answer("propertyName", "")
//!         .run()
//!         .await?;
//!
//!     assert_eq!(output.exit_code, Some(0));
//!     Ok(())
//! }
//! ```

// Lets the `rules!` macro name `::prompt_responder` from inside this crate.
extern crate self as prompt_responder;

// Re-export macros
pub use prompt_responder_macros::{regex, rules};

// Core types
pub mod answers;
pub mod config;
pub mod encoding;
pub mod error;
pub mod prelude;
pub mod transcript;

// Interpreter
pub mod filter;
pub mod responder;
pub mod rules;
pub mod settle;

// Process driver
pub mod session;
pub mod sync;

pub use answers::Answers;
pub use config::{LineEnding, SessionConfig};
pub use encoding::Utf8StreamDecoder;
pub use error::{ResponderError, Result, SpawnError};
pub use filter::{
    contains_control_sequence, escape_control, filter_insignificant, has_incomplete_escape,
    strip_control_sequences, strip_garbage,
};
pub use responder::{Detection, Responder};
pub use rules::{Response, Rule, RuleTable};
pub use session::{Session, SessionBuilder, SessionOutput};
pub use settle::{PendingBuffer, normalize_prompt};
pub use sync::block_on;
pub use transcript::{EntryKind, Transcript, TranscriptEntry};

// Test utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{
    OutputAssertions, Sandbox, SessionAssertions, TranscriptReporter, init_tracing,
};
