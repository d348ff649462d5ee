//! Configuration types for prompt-responder sessions.
//!
//! This module defines the session configuration (what to spawn, where, and
//! how long to wait) plus environment overrides and answer file loading.

pub mod env;
pub mod file;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub use env::{DEFAULT_PREFIX, EnvConfig};
pub use file::{ConfigFormat, load_answers, parse_answers};

/// Default deadline for a whole session (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default read size for the child's output pipes.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The command to execute.
    pub command: String,

    /// Command arguments.
    pub args: Vec<String>,

    /// Environment variables to set.
    pub env: HashMap<String, String>,

    /// Whether to inherit the parent environment.
    pub inherit_env: bool,

    /// Working directory for the process.
    pub working_dir: Option<PathBuf>,

    /// Deadline for the whole session; `None` waits forever.
    pub timeout: Option<Duration>,

    /// Line terminator appended to answers.
    pub line_ending: LineEnding,

    /// Maximum bytes read from a pipe at once.
    pub read_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            env: HashMap::new(),
            inherit_env: true,
            working_dir: None,
            timeout: Some(DEFAULT_TIMEOUT),
            line_ending: LineEnding::default(),
            read_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SessionConfig {
    /// Create a new session configuration with the given command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Set the command arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set whether to inherit the parent environment.
    #[must_use]
    pub const fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Set the session deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for the process without a deadline.
    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the line ending style.
    #[must_use]
    pub const fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the pipe read size.
    #[must_use]
    pub const fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Apply `RESPONDER_*` environment overrides.
    ///
    /// `TIMEOUT_SECS` sets the deadline (`0` disables it), `LINE_ENDING`
    /// accepts `lf`, `crlf` or `cr`, and `CHUNK_SIZE` sets the read size.
    #[must_use]
    pub fn apply_env(mut self, env: &EnvConfig) -> Self {
        if let Some(secs) = env.parse::<u64>("timeout_secs") {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(line_ending) = env.get("line_ending").and_then(|v| LineEnding::parse(&v)) {
            self.line_ending = line_ending;
        }
        if let Some(size) = env.parse::<usize>("chunk_size").filter(|s| *s > 0) {
            self.read_chunk_size = size;
        }
        self
    }
}

/// Line ending styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix-style line ending (LF).
    #[default]
    Lf,

    /// Windows-style line ending (CRLF).
    CrLf,

    /// Classic Mac line ending (CR).
    Cr,
}

impl LineEnding {
    /// Get the line ending as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Get the line ending as bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Parse a line ending name (`lf`, `crlf`, `cr`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lf" | "unix" => Some(Self::Lf),
            "crlf" | "windows" => Some(Self::CrLf),
            "cr" => Some(Self::Cr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_builder() {
        let config = SessionConfig::new("lb")
            .args(["model", "a-model"])
            .env("NO_COLOR", "1")
            .working_dir("/tmp/sandbox")
            .timeout(Duration::from_secs(10));

        assert_eq!(config.command, "lb");
        assert_eq!(config.args, vec!["model", "a-model"]);
        assert_eq!(config.env.get("NO_COLOR"), Some(&"1".to_string()));
        assert_eq!(config.working_dir, Some(PathBuf::from("/tmp/sandbox")));
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert!(config.inherit_env);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.read_chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(SessionConfig::default().no_timeout().timeout.is_none());
    }

    #[test]
    fn line_ending_as_str() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
        assert_eq!(LineEnding::Cr.as_bytes(), b"\r");
    }

    #[test]
    fn line_ending_parse() {
        assert_eq!(LineEnding::parse("CRLF"), Some(LineEnding::CrLf));
        assert_eq!(LineEnding::parse(" lf "), Some(LineEnding::Lf));
        assert_eq!(LineEnding::parse("cr"), Some(LineEnding::Cr));
        assert_eq!(LineEnding::parse("nl"), None);
    }
}
