//! Operator confirmation port.
//!
//! Confirmation questions (e.g., proceeding despite a host version mismatch)
//! go through the [`Prompter`] trait so that production code reads the
//! terminal while tests supply deterministic answers.

use std::io::Write as _;
use std::sync::Mutex;

use anyhow::{Context as _, Result};

/// A source of yes/no answers to operator questions.
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question and return the answer.
    ///
    /// `default_yes` controls what an empty answer means.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read (e.g., stdin closed).
    fn confirm(&self, question: &str, default_yes: bool) -> Result<bool>;
}

/// Interactive prompter reading answers from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn confirm(&self, question: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        let mut stderr = std::io::stderr();
        write!(stderr, "{question} {hint} ").context("writing prompt")?;
        stderr.flush().context("flushing prompt")?;

        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .context("reading answer")?;

        Ok(match answer.trim() {
            "" => default_yes,
            a => a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"),
        })
    }
}

/// Prompter that replays a fixed sequence of answers.
///
/// Used by tests and automation; answers are consumed in FIFO order and an
/// exhausted script answers `false` so a forgotten expectation can never
/// silently approve an action.
#[derive(Debug)]
pub struct ScriptedPrompter {
    answers: Mutex<std::collections::VecDeque<bool>>,
    exhausted_answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    /// Create a prompter that will answer with `answers` in order.
    #[must_use]
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            exhausted_answer: false,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Create a prompter that answers yes to everything.
    #[must_use]
    pub fn always_yes() -> Self {
        Self {
            answers: Mutex::new(std::collections::VecDeque::new()),
            exhausted_answer: true,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// The questions asked so far, in order.
    #[must_use]
    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str, _default_yes: bool) -> Result<bool> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
        let scripted = self
            .answers
            .lock()
            .map_or(None, |mut answers| answers.pop_front());
        Ok(scripted.unwrap_or(self.exhausted_answer))
    }
}
