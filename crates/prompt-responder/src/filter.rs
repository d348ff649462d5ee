//! Control-sequence filtering.
//!
//! Prompt libraries interleave text with cursor control codes. Two classes
//! carry no information for prompt detection and are dropped before
//! buffering: cursor show/hide (`ESC[?25h`, `ESC[?25l`) and cursor
//! forward/back (`ESC[<n>C`, `ESC[<n>D`). Every other sequence is kept,
//! because its presence is what tells the settle logic that a repaint is
//! still in progress.

use std::borrow::Cow;

use regex::Regex;

/// Cursor show/hide.
fn cursor_visibility() -> &'static Regex {
    crate::regex!(r"\x1b\[\?25[hl]")
}

/// Cursor forward/back by N columns.
fn cursor_horizontal() -> &'static Regex {
    crate::regex!(r"\x1b\[\d+[CD]")
}

/// CSI sequences that mark a buffer as mid-repaint.
fn control_sequence() -> &'static Regex {
    crate::regex!(r"\x1b\[\??(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-ORZcf-nqry=><]")
}

/// Looser match for anything that should not reach accumulated stdout.
fn garbage() -> &'static Regex {
    crate::regex!(r"[\x1b\x{9b}][\[()#;?]*(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-ORZcf-nqry=><]")
}

/// An escape sequence cut off at the end of the text.
fn incomplete_escape() -> &'static Regex {
    crate::regex!(r"\x1b(?:\[\??[0-9;]*)?$")
}

/// Remove cursor show/hide and cursor forward/back sequences.
///
/// All other bytes pass through unchanged.
#[must_use]
pub fn filter_insignificant(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') {
        return Cow::Borrowed(text);
    }

    match cursor_visibility().replace_all(text, "") {
        Cow::Borrowed(_) => cursor_horizontal().replace_all(text, ""),
        Cow::Owned(s) => Cow::Owned(cursor_horizontal().replace_all(&s, "").into_owned()),
    }
}

/// Check whether the text still contains a control sequence.
#[must_use]
pub fn contains_control_sequence(text: &str) -> bool {
    text.contains('\x1b') && control_sequence().is_match(text)
}

/// Remove all control sequences recognized by [`contains_control_sequence`].
#[must_use]
pub fn strip_control_sequences(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') {
        return Cow::Borrowed(text);
    }
    control_sequence().replace_all(text, "")
}

/// Check whether the text ends in the middle of an escape sequence.
#[must_use]
pub fn has_incomplete_escape(text: &str) -> bool {
    text.contains('\x1b') && incomplete_escape().is_match(text)
}

/// Strip terminal garbage from text destined for captured stdout.
///
/// Broader than [`strip_control_sequences`]: also removes 8-bit CSI and
/// charset designations such as `ESC(B`.
#[must_use]
pub fn strip_garbage(text: &str) -> Cow<'_, str> {
    if !text.contains(['\x1b', '\u{9b}']) {
        return Cow::Borrowed(text);
    }
    garbage().replace_all(text, "")
}

/// Render escape characters visibly, for transcripts and logs.
#[must_use]
pub fn escape_control(text: &str) -> Cow<'_, str> {
    if text.contains('\x1b') {
        Cow::Owned(text.replace('\x1b', "<ESC>"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_cursor_visibility() {
        assert_eq!(
            filter_insignificant("\x1b[?25l? Pick one: (Use arrow keys)\x1b[?25h"),
            "? Pick one: (Use arrow keys)"
        );
    }

    #[test]
    fn removes_cursor_forward_and_back() {
        assert_eq!(filter_insignificant("abc\x1b[3Dxyz\x1b[12C!"), "abcxyz!");
    }

    #[test]
    fn keeps_other_sequences() {
        let text = "\x1b[2K\x1b[1G? Name: \x1b[1A\x1b[32mok\x1b[39m";
        assert_eq!(filter_insignificant(text), text);
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(filter_insignificant("plain"), Cow::Borrowed(_)));
        assert!(matches!(strip_control_sequences("plain"), Cow::Borrowed(_)));
        assert!(matches!(strip_garbage("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn detects_control_sequences() {
        assert!(contains_control_sequence("\x1b[2K"));
        assert!(contains_control_sequence("text\x1b[1G"));
        assert!(contains_control_sequence("\x1b[32mgreen"));
        assert!(contains_control_sequence("\x1b[?1049h"));
        assert!(!contains_control_sequence("no escapes here"));
        assert!(!contains_control_sequence("lone \x1b escape"));
    }

    #[test]
    fn strips_control_sequences() {
        assert_eq!(strip_control_sequences("\x1b[2K\x1b[1G  \x1b[1A"), "  ");
        assert_eq!(
            strip_control_sequences("\x1b[32m?\x1b[39m Name:"),
            "? Name:"
        );
    }

    #[test]
    fn detects_incomplete_tail() {
        assert!(has_incomplete_escape("? Name: \x1b"));
        assert!(has_incomplete_escape("? Name: \x1b["));
        assert!(has_incomplete_escape("? Name: \x1b[?2"));
        assert!(has_incomplete_escape("\x1b[12;4"));
        assert!(!has_incomplete_escape("\x1b[2K? Name: "));
        assert!(!has_incomplete_escape("plain"));
    }

    #[test]
    fn garbage_is_stripped_from_stdout() {
        assert_eq!(strip_garbage("\x1b(Bcreate \x1b[1mfile\x1b[22m"), "create file");
        assert_eq!(strip_garbage("\u{9b}2Jcleared"), "cleared");
    }

    #[test]
    fn escape_control_renders_esc() {
        assert_eq!(escape_control("\x1b[2Kx"), "<ESC>[2Kx");
        assert!(matches!(escape_control("x"), Cow::Borrowed(_)));
    }
}
