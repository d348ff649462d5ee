//! Result of a finished session.

use std::process::ExitStatus;

use crate::transcript::Transcript;

/// Everything a finished session produced.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    /// Standard output with terminal control sequences stripped.
    pub stdout: String,
    /// Standard error, as written.
    pub stderr: String,
    /// Exit code, or `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Terminating signal number (Unix only).
    pub signal: Option<i32>,
    /// Diagnostic transcript of prompts and responses.
    pub transcript: Transcript,
}

impl SessionOutput {
    pub(crate) fn new(
        stdout: String,
        stderr: String,
        status: ExitStatus,
        transcript: Transcript,
    ) -> Self {
        let (exit_code, signal) = exit_parts(status);
        Self {
            stdout,
            stderr,
            exit_code,
            signal,
            transcript,
        }
    }

    /// Check if the process exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Name of the terminating signal, e.g. `SIGKILL`.
    #[must_use]
    pub fn signal_name(&self) -> Option<&'static str> {
        self.signal.map(signal_name)
    }
}

#[cfg(unix)]
fn exit_parts(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    use std::os::unix::process::ExitStatusExt;
    (status.code(), status.signal())
}

#[cfg(not(unix))]
fn exit_parts(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    (status.code(), None)
}

#[cfg(unix)]
fn signal_name(signal: i32) -> &'static str {
    match signal {
        libc::SIGHUP => "SIGHUP",
        libc::SIGINT => "SIGINT",
        libc::SIGQUIT => "SIGQUIT",
        libc::SIGILL => "SIGILL",
        libc::SIGABRT => "SIGABRT",
        libc::SIGFPE => "SIGFPE",
        libc::SIGKILL => "SIGKILL",
        libc::SIGSEGV => "SIGSEGV",
        libc::SIGPIPE => "SIGPIPE",
        libc::SIGALRM => "SIGALRM",
        libc::SIGTERM => "SIGTERM",
        libc::SIGUSR1 => "SIGUSR1",
        libc::SIGUSR2 => "SIGUSR2",
        _ => "unknown signal",
    }
}

#[cfg(not(unix))]
fn signal_name(_signal: i32) -> &'static str {
    "unknown signal"
}
