//! Prompt rendering.
//!
//! Mimics a full-screen prompt library writing to a pipe: the question is
//! printed without a newline, and once answered the line is erased and
//! redrawn with the answer. List prompts hide the cursor, print their
//! choices and move back up over them when redrawing.

use std::io::{BufRead, Write};

use crate::ScaffoldError;

const ERASE_LINE: &str = "\x1b[2K\x1b[G";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const POINTER: &str = "\u{276f}";

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    fn read_answer(&mut self) -> Result<String, ScaffoldError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ScaffoldError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&mut self, text: &str) -> Result<(), ScaffoldError> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    /// Free-text question, optionally with a default shown in parentheses.
    pub fn input(&mut self, question: &str, default: Option<&str>) -> Result<String, ScaffoldError> {
        match default {
            Some(default) => self.show(&format!("? {question} ({default}) "))?,
            None => self.show(&format!("? {question} "))?,
        }

        let mut answer = self.read_answer()?;
        if answer.is_empty() {
            if let Some(default) = default {
                answer = default.to_string();
            }
        }

        self.show(&format!("{ERASE_LINE}? {question} {answer}\n"))?;
        Ok(answer)
    }

    /// Yes/no question.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool, ScaffoldError> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        self.show(&format!("? {question} {hint} "))?;

        let answer = self.read_answer()?;
        let value = match answer.trim().to_ascii_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        };

        let shown = if value { "Yes" } else { "No" };
        self.show(&format!("{ERASE_LINE}? {question} {shown}\n"))?;
        Ok(value)
    }

    /// Pick one of `choices`; an empty answer takes the highlighted first one.
    pub fn list<'c>(&mut self, question: &str, choices: &[&'c str]) -> Result<&'c str, ScaffoldError> {
        self.select(question, choices, 0)
    }

    /// Pick one of `choices` with the pointer starting on `default`.
    pub fn select<'c>(
        &mut self,
        question: &str,
        choices: &[&'c str],
        default: usize,
    ) -> Result<&'c str, ScaffoldError> {
        let Some(&highlighted) = choices.get(default) else {
            return Err(ScaffoldError::Usage(format!("no choices for {question:?}")));
        };

        let mut rendered = format!("{HIDE_CURSOR}? {question} (Use arrow keys)");
        for (i, choice) in choices.iter().enumerate() {
            let marker = if i == default { POINTER } else { " " };
            rendered.push_str(&format!("\n{marker} {choice}"));
        }
        self.show(&rendered)?;

        let answer = self.read_answer()?;
        let picked = choices
            .iter()
            .copied()
            .find(|c| !answer.is_empty() && *c == answer)
            .unwrap_or(highlighted);

        self.show(&format!(
            "\x1b[{}A{ERASE_LINE}? {question} {picked}{SHOW_CURSOR}\n",
            choices.len()
        ))?;
        Ok(picked)
    }
}
