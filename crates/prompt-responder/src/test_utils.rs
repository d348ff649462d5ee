//! Test utilities for prompt-responder.
//!
//! Helpers for end-to-end tests of interactive CLIs: a throwaway working
//! directory for the child to scaffold into, assertions over session output,
//! a guard that prints the transcript when a test panics, and a tracing
//! subscriber that routes the dialogue into the test output.

mod assertions;
mod reporter;
mod sandbox;

pub use assertions::{OutputAssertions, SessionAssertions};
pub use reporter::TranscriptReporter;
pub use sandbox::Sandbox;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber.
///
/// Reads `RUST_LOG` (default `warn`), so
/// `RUST_LOG=prompt_responder::transcript=debug` prints every prompt and
/// answer. Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
