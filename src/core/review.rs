//! Change summary and the accept / abort / details prompt.

use crate::domain::model::{Category, ChangeSet};
use crate::domain::ports::AnswerSource;
use crate::utils::error::Result;
use std::io::Write;

pub const PROMPT: &str = "Accept changes [y], abort [n], show details [d]: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Accept,
    Abort,
    Details,
    Unrecognized,
}

impl Answer {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" => Answer::Accept,
            "n" => Answer::Abort,
            "d" => Answer::Details,
            _ => Answer::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Prompting,
    Committing,
    Aborted,
}

impl ReviewState {
    /// `None` is end of input, which aborts.
    pub fn next(self, answer: Option<Answer>) -> ReviewState {
        match (self, answer) {
            (ReviewState::Prompting, None) => ReviewState::Aborted,
            (ReviewState::Prompting, Some(Answer::Accept)) => ReviewState::Committing,
            (ReviewState::Prompting, Some(Answer::Abort)) => ReviewState::Aborted,
            (ReviewState::Prompting, Some(Answer::Details | Answer::Unrecognized)) => {
                ReviewState::Prompting
            }
            (terminal, _) => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != ReviewState::Prompting
    }
}

pub fn write_summary<W: Write>(out: &mut W, changes: &ChangeSet) -> Result<()> {
    writeln!(out, "The following changes will be applied:")?;
    for category in Category::COMMIT_ORDER {
        writeln!(
            out,
            "  - {}: {}",
            category.summary_label(),
            changes.count(category)
        )?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn write_details<W: Write>(out: &mut W, changes: &ChangeSet) -> Result<()> {
    let json = serde_json::to_string_pretty(changes)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Prompts until the change set is accepted or rejected. Asking for details
/// prints the full change set and asks again.
pub fn review<A: AnswerSource + ?Sized, W: Write>(
    changes: &ChangeSet,
    answers: &mut A,
    out: &mut W,
) -> Result<ReviewState> {
    let mut state = ReviewState::Prompting;

    while !state.is_terminal() {
        out.flush()?;
        let answer = answers.next_answer(PROMPT)?.map(|line| Answer::parse(&line));
        match answer {
            Some(Answer::Details) => write_details(out, changes)?,
            Some(Answer::Unrecognized) => tracing::debug!("Ignoring unrecognized answer"),
            None => tracing::warn!("Input closed before the changes were confirmed"),
            _ => {}
        }
        state = state.next(answer);
    }

    Ok(state)
}
