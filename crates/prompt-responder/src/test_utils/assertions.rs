//! Custom assertion helpers for session tests.

use regex::Regex;

use crate::session::SessionOutput;
use crate::transcript::EntryKind;

/// Assertion helpers for captured text.
pub trait OutputAssertions {
    /// Get the output as a string.
    fn as_str(&self) -> &str;

    /// Assert that output contains a literal string.
    fn assert_contains(&self, needle: &str) {
        let output = self.as_str();
        assert!(
            output.contains(needle),
            "Expected output to contain {needle:?}, but got:\n{output}"
        );
    }

    /// Assert that output does not contain a literal string.
    fn assert_not_contains(&self, needle: &str) {
        let output = self.as_str();
        assert!(
            !output.contains(needle),
            "Expected output NOT to contain {needle:?}, but found it in:\n{output}"
        );
    }

    /// Assert that output matches a regex pattern.
    fn assert_matches(&self, pattern: &str) {
        let output = self.as_str();
        let re = Regex::new(pattern).expect("Invalid regex pattern");
        assert!(
            re.is_match(output),
            "Expected output to match pattern {pattern:?}, but got:\n{output}"
        );
    }

    /// Assert that output contains no escape characters.
    fn assert_no_escapes(&self) {
        let output = self.as_str();
        assert!(
            !output.contains('\x1b'),
            "Expected output without escape sequences, but got:\n{}",
            output.replace('\x1b', "<ESC>")
        );
    }
}

impl OutputAssertions for str {
    fn as_str(&self) -> &str {
        self
    }
}

impl OutputAssertions for String {
    fn as_str(&self) -> &str {
        self.as_str()
    }
}

/// Assertion helpers for a finished session.
///
/// Every failure message includes the transcript.
pub trait SessionAssertions {
    /// Assert that the child exited with status 0.
    fn assert_success(&self);

    /// Assert a specific exit code.
    fn assert_exit_code(&self, expected: i32);

    /// Assert that the child was terminated by a signal.
    fn assert_signaled(&self);

    /// Assert that the child did not exit with status 0.
    fn assert_failure(&self);

    /// Assert that a prompt matching `pattern` was answered.
    fn assert_prompted(&self, pattern: &str);

    /// Assert that no question (text starting with `?`) went unrecognized.
    ///
    /// Plain status lines such as `create ...` may settle and be ignored
    /// depending on how the child's writes were coalesced, so they are not
    /// counted.
    fn assert_no_ignored_questions(&self);
}

impl SessionAssertions for SessionOutput {
    fn assert_success(&self) {
        assert!(
            self.success(),
            "Expected exit code 0, got {:?} (signal {:?})\nstderr:\n{}\n{}",
            self.exit_code,
            self.signal_name(),
            self.stderr,
            self.transcript
        );
    }

    fn assert_exit_code(&self, expected: i32) {
        assert_eq!(
            self.exit_code,
            Some(expected),
            "Unexpected exit status\nstderr:\n{}\n{}",
            self.stderr,
            self.transcript
        );
    }

    fn assert_signaled(&self) {
        assert!(
            self.signal.is_some(),
            "Expected the child to be killed by a signal, got exit code {:?}\n{}",
            self.exit_code,
            self.transcript
        );
    }

    fn assert_failure(&self) {
        assert!(
            !self.success(),
            "Expected the child to fail, but it exited with status 0\n{}",
            self.transcript
        );
    }

    fn assert_prompted(&self, pattern: &str) {
        let re = Regex::new(pattern).expect("Invalid regex pattern");
        assert!(
            self.transcript
                .of_kind(EntryKind::Prompt)
                .any(|e| re.is_match(&e.text)),
            "Expected a prompt matching {pattern:?}\n{}",
            self.transcript
        );
    }

    fn assert_no_ignored_questions(&self) {
        let ignored: Vec<&str> = self
            .transcript
            .of_kind(EntryKind::Ignored)
            .map(|e| e.text.as_str())
            .filter(|text| text.starts_with('?'))
            .collect();
        assert!(
            ignored.is_empty(),
            "Unrecognized questions: {ignored:?}\n{}",
            self.transcript
        );
    }
}
