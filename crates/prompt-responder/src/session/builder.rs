//! Session builder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{Session, SessionOutput};
use crate::answers::Answers;
use crate::config::{EnvConfig, LineEnding, SessionConfig};
use crate::error::Result;
use crate::rules::RuleTable;

/// Builder for a [`Session`].
///
/// Starts from [`SessionConfig::new`] with `RESPONDER_*` environment
/// overrides applied; explicit setters take precedence over them.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    config: SessionConfig,
    answers: Answers,
    rules: Option<Arc<RuleTable>>,
}

impl SessionBuilder {
    /// Create a builder for `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_config(SessionConfig::new(command).apply_env(&EnvConfig::default()))
    }

    /// Create a builder from an existing configuration, as is.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            answers: Answers::new(),
            rules: None,
        }
    }

    /// Add a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.args.push(arg.into());
        self
    }

    /// Add several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn current_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.working_dir = Some(path.into());
        self
    }

    /// Set an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.insert(key.into(), value.into());
        self
    }

    /// Start the child with only the variables set through [`Self::env`].
    #[must_use]
    pub const fn clear_env(mut self) -> Self {
        self.config.inherit_env = false;
        self
    }

    /// Add a scripted answer.
    #[must_use]
    pub fn answer(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.answers.insert(key, value);
        self
    }

    /// Add every answer from `answers`, replacing existing keys.
    #[must_use]
    pub fn answers(mut self, answers: &Answers) -> Self {
        self.answers.extend(answers.iter());
        self
    }

    /// Add answers from a `.toml` or `.json` file.
    pub fn answers_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let answers = Answers::from_path(path)?;
        Ok(self.answers(&answers))
    }

    /// Use a custom rule table instead of [`RuleTable::scaffold`].
    #[must_use]
    pub fn rules(mut self, rules: impl Into<Arc<RuleTable>>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Set the whole-session deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Let the session run without a deadline.
    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the line terminator sent after answers.
    #[must_use]
    pub const fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.config.line_ending = line_ending;
        self
    }

    /// Set the size of each stdout/stderr read.
    #[must_use]
    pub const fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Session {
        let rules = self.rules.unwrap_or_else(super::scaffold_rules);
        Session::new(self.config, self.answers, rules)
    }

    /// Build and run the session.
    pub async fn run(self) -> Result<SessionOutput> {
        self.build().run().await
    }

    /// Build and run the session on a private runtime.
    pub fn run_blocking(self) -> Result<SessionOutput> {
        self.build().run_blocking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_configuration() {
        let session = SessionBuilder::with_config(SessionConfig::new("lb"))
            .arg("model")
            .args(["--skip-install", "pets"])
            .current_dir("/tmp/sandbox")
            .env("NO_COLOR", "1")
            .answer("modelName", "a-model")
            .answer("exposeModel", true)
            .timeout(Duration::from_secs(5))
            .line_ending(LineEnding::CrLf)
            .build();

        let config = session.config();
        assert_eq!(config.command, "lb");
        assert_eq!(config.args, vec!["model", "--skip-install", "pets"]);
        assert_eq!(config.working_dir.as_deref(), Some(Path::new("/tmp/sandbox")));
        assert_eq!(config.env.get("NO_COLOR").map(String::as_str), Some("1"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert_eq!(session.answers().get("exposeModel"), Some("true"));
        assert_eq!(session.rules().len(), RuleTable::scaffold().len());
    }

    #[test]
    fn answers_merge_and_replace() {
        let base = Answers::new().with("appName", "base").with("appDir", ".");
        let session = SessionBuilder::with_config(SessionConfig::new("lb"))
            .answer("appName", "first")
            .answers(&base)
            .answer("appDir", "out")
            .build();

        assert_eq!(session.answers().get("appName"), Some("base"));
        assert_eq!(session.answers().get("appDir"), Some("out"));
    }

    #[test]
    fn default_rules_are_shared() {
        let a = SessionBuilder::with_config(SessionConfig::new("lb")).build();
        let b = SessionBuilder::with_config(SessionConfig::new("lb")).build();
        assert!(Arc::ptr_eq(a.rules(), b.rules()));

        let custom = RuleTable::new()
            .rule(r"\? Name:$", crate::rules::Response::named("name"))
            .unwrap();
        let c = SessionBuilder::with_config(SessionConfig::new("lb"))
            .rules(custom)
            .build();
        assert_eq!(c.rules().len(), 1);
    }
}
