//! Session driver.
//!
//! A [`Session`] runs one child process to completion: it spawns the command,
//! answers its prompts through a [`Responder`](crate::responder::Responder)
//! and returns a [`SessionOutput`] with the captured streams, the exit status
//! and the transcript.
//!
//! # Examples
//!
//! ```ignore
//! use prompt_responder::Session;
//!
//! #[tokio::main]
//! async fn main() -> prompt_responder::Result<()> {
//!     let output = Session::builder("lb")
//!         .arg("app")
//!         .answer("appName", "test-app")
//!         .answer("appDir", ".")
//!         .run()
//!         .await?;
//!
//!     assert!(output.success(), "{}", output.transcript);
//!     Ok(())
//! }
//! ```
//!
//! ## Blocking
//!
//! ```ignore
//! use prompt_responder::Session;
//!
//! let output = Session::builder("lb").arg("--version").run_blocking()?;
//! println!("{}", output.stdout);
//! ```

mod builder;
mod driver;
mod output;

use std::sync::{Arc, OnceLock};

pub use builder::SessionBuilder;
pub use output::SessionOutput;

use crate::answers::Answers;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::rules::RuleTable;

/// The scaffold rule table, built once and shared by every session.
fn scaffold_rules() -> Arc<RuleTable> {
    static RULES: OnceLock<Arc<RuleTable>> = OnceLock::new();
    Arc::clone(RULES.get_or_init(|| Arc::new(RuleTable::scaffold())))
}

/// A configured, runnable session.
///
/// Running does not consume the session, so the same configuration can be
/// run several times; each run gets its own buffer and transcript.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    answers: Answers,
    rules: Arc<RuleTable>,
}

impl Session {
    /// Start building a session for `command`.
    #[must_use]
    pub fn builder(command: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(command)
    }

    /// Create a session from its parts.
    #[must_use]
    pub const fn new(config: SessionConfig, answers: Answers, rules: Arc<RuleTable>) -> Self {
        Self {
            config,
            answers,
            rules,
        }
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The scripted answers.
    #[must_use]
    pub const fn answers(&self) -> &Answers {
        &self.answers
    }

    /// The rule table.
    #[must_use]
    pub const fn rules(&self) -> &Arc<RuleTable> {
        &self.rules
    }

    /// Run the child to completion.
    ///
    /// # Errors
    ///
    /// - [`ResponderError::Spawn`](crate::ResponderError::Spawn) if the child
    ///   cannot be started
    /// - [`ResponderError::MissingAnswer`](crate::ResponderError::MissingAnswer)
    ///   if a prompt asks for an answer that was not given; the child is killed
    /// - [`ResponderError::Timeout`](crate::ResponderError::Timeout) if the
    ///   deadline passes first; the child is killed
    pub async fn run(&self) -> Result<SessionOutput> {
        driver::run(self).await
    }

    /// Run the child to completion on a private current-thread runtime.
    ///
    /// # Errors
    ///
    /// Same as [`Session::run`], plus an I/O error if the runtime cannot be
    /// created.
    pub fn run_blocking(&self) -> Result<SessionOutput> {
        crate::sync::block_on(self.run())?
    }
}
