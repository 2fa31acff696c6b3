use crate::domain::ports::AnswerSource;
use crate::utils::error::Result;
use std::io::{BufRead, Write};

/// Reads answers line by line, writing the prompt before each read.
pub struct LineAnswers<R: BufRead, W: Write> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> LineAnswers<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }
}

impl LineAnswers<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> AnswerSource for LineAnswers<R, W> {
    fn next_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.prompt_out, "{}", prompt)?;
        self.prompt_out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
