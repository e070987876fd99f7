//! Interaction implementations: console, batch (decline everything) and scripted.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use tracing::{info, warn};

use super::{Interaction, NumberConstraints};

/// Prompts on a text stream. An empty answer takes the default; end of input
/// or a cancel word declines.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Create a prompt over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Interaction for ConsolePrompt<R, W> {
    fn prompt_number(
        &mut self,
        message: &str,
        default: f64,
        constraints: NumberConstraints,
    ) -> Option<f64> {
        loop {
            // a broken output stream still lets us read answers
            let _ = write!(self.output, "{} <{}>: ", message.trim(), default);
            let _ = self.output.flush();

            let answer = self.read_line()?;
            if answer.is_empty() {
                return Some(default);
            }
            if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("cancel") {
                return None;
            }

            match answer.parse::<f64>() {
                Ok(value) if constraints.accepts(value) => return Some(value),
                Ok(_) => {
                    let _ = writeln!(self.output, "Value must be positive and nonzero.");
                }
                Err(_) => {
                    let _ = writeln!(self.output, "Requires numeric value.");
                }
            }
        }
    }

    fn message(&mut self, text: &str) {
        let _ = writeln!(self.output, "{}", text.trim());
    }
}

/// Non-interactive sessions: every prompt is declined, messages go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclinePrompt;

impl Interaction for DeclinePrompt {
    fn prompt_number(&mut self, message: &str, _: f64, _: NumberConstraints) -> Option<f64> {
        info!("Declined prompt: {}", message.trim());
        None
    }

    fn message(&mut self, text: &str) {
        warn!("{}", text.trim());
    }
}

/// Replays queued answers and records everything asked. Runs out → declines.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<f64>>,
    /// Prompt messages in order.
    pub prompts: Vec<String>,
    /// Diagnostic messages in order.
    pub messages: Vec<String>,
}

impl ScriptedPrompt {
    /// Create a prompt that answers from the given queue.
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Interaction for ScriptedPrompt {
    fn prompt_number(
        &mut self,
        message: &str,
        _default: f64,
        _constraints: NumberConstraints,
    ) -> Option<f64> {
        self.prompts.push(message.trim().to_string());
        self.answers.pop_front().flatten()
    }

    fn message(&mut self, text: &str) {
        self.messages.push(text.trim().to_string());
    }
}
