//! Terminal implementations of the turn-cycle seams
//!
//! Line-based prompts on stdin, streamed assistant text rendered dim on
//! stdout, command errors on stderr. All reads are plain blocking line
//! reads; the cycle is serialized anyway.

use anyhow::Result;
use chatsh_core::agent::{interpret_answer, ConfirmationGate, TaskInput, TurnOutput};
use console::Style;
use std::io::{self, BufRead, Write};

/// Reads one task per line behind a `$ ` prompt.
pub struct TerminalInput;

#[async_trait::async_trait]
impl TaskInput for TerminalInput {
    async fn next_task(&mut self) -> Result<Option<String>> {
        print!("$ ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            // Input stream closed; the loop ends gracefully.
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches('\n').to_string()))
    }
}

/// The yes/no execution gate. Empty input or `y` confirms.
pub struct TerminalGate {
    prompt_style: Style,
}

impl TerminalGate {
    pub fn new() -> Self {
        TerminalGate {
            prompt_style: Style::new().bold(),
        }
    }
}

impl Default for TerminalGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfirmationGate for TerminalGate {
    async fn confirm(&mut self, prompt: &str) -> Result<bool> {
        print!("{} ", self.prompt_style.apply_to(prompt));
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        println!();
        Ok(interpret_answer(&line))
    }
}

/// Renders the cycle's output: dim streamed reply, plain command output,
/// errors on stderr.
pub struct TerminalOutput {
    reply_style: Style,
}

impl TerminalOutput {
    pub fn new() -> Self {
        TerminalOutput {
            reply_style: Style::new().dim(),
        }
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnOutput for TerminalOutput {
    fn fragment(&mut self, text: &str) {
        print!("{}", self.reply_style.apply_to(text));
        let _ = io::stdout().flush();
    }

    fn reply_done(&mut self) {
        println!("\n");
    }

    fn command_stdout(&mut self, text: &str) {
        println!("{}", text);
    }

    fn command_stderr(&mut self, text: &str) {
        eprintln!("{}", text);
    }

    fn error(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}
