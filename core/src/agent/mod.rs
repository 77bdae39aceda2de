//! Turn-cycle controller
//!
//! Drives one full cycle: prompt the user, stream the model's reply, extract
//! a script, gate on confirmation, execute or skip, and fold the result into
//! the next turn's input. The whole cycle is deliberately serialized; there
//! is never more than one in-flight request, pending confirmation, or
//! running subprocess at a time.

use crate::executor::{run_script, ResultEnvelope};
use crate::llm::{ChatMessage, LlmBackend};
use crate::parser::extract_script;
use crate::session::ConversationLog;
use anyhow::Result;
use futures_util::StreamExt;

/// How many prior messages are replayed to history-based backends.
/// Small on purpose: long replays confuse the smaller local models.
const HISTORY_WINDOW: usize = 4;

/// States of the turn cycle, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Blocked on the next user task
    AwaitingTask,
    /// Consuming the backend's fragment stream
    Streaming,
    /// Blocked on the yes/no execution gate
    AwaitingConfirmation,
    /// Waiting on the subprocess
    Executing,
}

/// Outcome of driving one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// The cycle restarts with the next task
    Continue,
    /// The input stream closed; the loop ends gracefully
    Ended,
}

/// Source of user tasks. Returns `None` when the input stream closes.
#[async_trait::async_trait]
pub trait TaskInput: Send {
    async fn next_task(&mut self) -> Result<Option<String>>;
}

/// The single yes/no prompt that gates execution.
#[async_trait::async_trait]
pub trait ConfirmationGate: Send {
    async fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Sink for everything the cycle shows the user.
pub trait TurnOutput: Send {
    /// One streamed assistant fragment, written as it arrives
    fn fragment(&mut self, text: &str);
    /// The assistant reply finished streaming
    fn reply_done(&mut self);
    /// Command output for standard output
    fn command_stdout(&mut self, text: &str);
    /// Command output for standard error
    fn command_stderr(&mut self, text: &str);
    /// An error surfaced immediately, in addition to the fold-back
    fn error(&mut self, text: &str);
}

/// Map one line of gate input to a decision.
///
/// An empty answer and a case-insensitive `y` mean yes; everything else,
/// including whitespace, is a decline. Only the line terminator is stripped
/// before comparison. Declining is normal control flow, not an error.
pub fn interpret_answer(input: &str) -> bool {
    let answer = input.trim_end_matches(['\n', '\r']);
    answer.is_empty() || answer.eq_ignore_ascii_case("y")
}

/// The turn-cycle state machine.
///
/// Owns the conversation log and the single result-envelope slot carried
/// between cycles; both are touched only from this one logical thread.
pub struct TurnCycle<I, G, O> {
    backend: Box<dyn LlmBackend>,
    input: I,
    gate: G,
    output: O,
    log: ConversationLog,
    prior_envelope: String,
    state: TurnState,
}

impl<I, G, O> TurnCycle<I, G, O>
where
    I: TaskInput,
    G: ConfirmationGate,
    O: TurnOutput,
{
    pub fn new(backend: Box<dyn LlmBackend>, input: I, gate: G, output: O) -> Self {
        TurnCycle {
            backend,
            input,
            gate,
            output,
            log: ConversationLog::new(),
            prior_envelope: String::new(),
            state: TurnState::AwaitingTask,
        }
    }

    /// Run cycles until the input stream closes.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            if self.run_turn().await? == TurnStatus::Ended {
                return Ok(());
            }
        }
    }

    /// Drive exactly one turn of the state machine.
    pub async fn run_turn(&mut self) -> Result<TurnStatus> {
        self.state = TurnState::AwaitingTask;
        let Some(task) = self.input.next_task().await? else {
            return Ok(TurnStatus::Ended);
        };

        // The envelope from the previous cycle is consumed exactly once.
        let turn_input = format!("{}{}", std::mem::take(&mut self.prior_envelope), task);

        self.state = TurnState::Streaming;
        let message = self.stream_reply(&turn_input).await;

        let Some(script) = extract_script(&message) else {
            return Ok(TurnStatus::Continue);
        };

        self.state = TurnState::AwaitingConfirmation;
        if !self.gate.confirm("EXECUTE? [y/n]").await? {
            self.prior_envelope = ResultEnvelope::Skipped.render();
            return Ok(TurnStatus::Continue);
        }

        self.state = TurnState::Executing;
        let envelope = match run_script(&script).await {
            Ok(result) => {
                if result.success {
                    if !result.stdout.is_empty() {
                        self.output.command_stdout(&result.stdout);
                    }
                    if !result.stderr.is_empty() {
                        self.output.command_stderr(&result.stderr);
                    }
                } else {
                    self.output.error(&result.status_message());
                }
                ResultEnvelope::from_result(&result)
            }
            Err(e) => {
                // The interpreter itself could not be launched.
                self.output.error(&e.to_string());
                ResultEnvelope::Failed {
                    message: e.to_string(),
                }
            }
        };

        self.prior_envelope = envelope.render();
        Ok(TurnStatus::Continue)
    }

    /// Consume the backend stream, rendering fragments as they arrive, and
    /// append the completed exchange to the log.
    ///
    /// A transport failure mid-stream truncates the reply; the partial text
    /// is treated as final rather than crashing the turn.
    async fn stream_reply(&mut self, turn_input: &str) -> String {
        let mut stream = self
            .backend
            .send_message(turn_input, self.log.last_n(HISTORY_WINDOW));

        let mut complete_message = String::new();
        let mut reply_id = String::new();

        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(fragment) => {
                    self.output.fragment(&fragment.content);
                    complete_message.push_str(&fragment.content);
                    reply_id = fragment.id;
                }
                Err(e) => {
                    tracing::warn!("stream ended abnormally: {}", e);
                    break;
                }
            }
        }
        drop(stream);
        self.output.reply_done();

        let message = complete_message.trim().to_string();
        self.log.append(ChatMessage::user(turn_input));
        self.log.append(ChatMessage::assistant(&message, &reply_id));
        message
    }

    /// Current state, for inspection in tests.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The conversation log, for inspection in tests.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The envelope pending for the next turn, for inspection in tests.
    pub fn prior_envelope(&self) -> &str {
        &self.prior_envelope
    }
}
