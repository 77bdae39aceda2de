//! Command executor
//!
//! Runs an extracted script through the system shell as a single subprocess
//! and captures its output fully buffered. There is no sandboxing and no
//! shell parsing here: the whole script is handed to `sh -c` verbatim, and
//! the human confirmation gate is the only safeguard.

use crate::error::ChatshError;
use tokio::process::Command;

/// Result of running one extracted script
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the interpreter exited with status zero
    pub success: bool,
    /// Exit code, absent when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Standard output, fully buffered
    pub stdout: String,
    /// Standard error, fully buffered
    pub stderr: String,
}

impl ExecutionResult {
    /// Interpreter-level description of a failed run.
    ///
    /// The failure envelope deliberately carries only this text, never the
    /// captured stdout/stderr.
    pub fn status_message(&self) -> String {
        match self.exit_code {
            Some(code) => format!("command exited with code {}", code),
            None => "command terminated by signal".to_string(),
        }
    }
}

/// Run a script as one `sh -c` invocation and capture its output.
///
/// A non-zero exit is an `Ok` result with `success == false`; only a failure
/// to launch the interpreter itself surfaces as an error.
pub async fn run_script(script: &str) -> Result<ExecutionResult, ChatshError> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(script)
        .output()
        .await
        .map_err(|e| ChatshError::Execution {
            reason: e.to_string(),
        })?;

    Ok(ExecutionResult {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Normalized summary of a turn's execution outcome.
///
/// Rendered text is prepended to the next user task; the trailing newline
/// keeps it visually separate from whatever the user types next.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope {
    /// The command ran and exited zero
    Executed { stdout: String, stderr: String },
    /// The command failed; only the interpreter-level message is kept
    Failed { message: String },
    /// The user declined execution
    Skipped,
}

impl ResultEnvelope {
    /// Build the envelope for a completed run.
    pub fn from_result(result: &ExecutionResult) -> Self {
        if result.success {
            ResultEnvelope::Executed {
                stdout: result.stdout.clone(),
                stderr: result.stderr.clone(),
            }
        } else {
            ResultEnvelope::Failed {
                message: result.status_message(),
            }
        }
    }

    /// Render the envelope text fed back into the next turn's prompt.
    pub fn render(&self) -> String {
        match self {
            ResultEnvelope::Executed { stdout, stderr } => {
                format!("Command executed. Output:\n{}\n{}\n", stdout, stderr)
            }
            ResultEnvelope::Failed { message } => {
                format!("Command failed. Output:\n{}\n", message)
            }
            ResultEnvelope::Skipped => "Command skipped.\n".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let result = run_script("echo hello").await.unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
    }

    #[tokio::test]
    async fn test_run_captures_stderr_and_exit_code() {
        let result = run_script("echo oops >&2; exit 3").await.unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_whole_script_goes_to_one_shell() {
        // Pipes and variables only work if the text is not split by us
        let result = run_script("x=chat; printf '%s' \"${x}sh\" | tr a-z A-Z")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stdout, "CHATSH");
    }

    #[test]
    fn test_executed_envelope_shape() {
        let envelope = ResultEnvelope::Executed {
            stdout: "hello\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(envelope.render(), "Command executed. Output:\nhello\n\n\n");
    }

    #[test]
    fn test_failed_envelope_drops_captured_output() {
        let result = ExecutionResult {
            success: false,
            exit_code: Some(2),
            stdout: "partial output\n".to_string(),
            stderr: "noise\n".to_string(),
        };
        let envelope = ResultEnvelope::from_result(&result);
        assert_eq!(
            envelope.render(),
            "Command failed. Output:\ncommand exited with code 2\n"
        );
    }

    #[test]
    fn test_skipped_envelope_shape() {
        assert_eq!(ResultEnvelope::Skipped.render(), "Command skipped.\n");
    }
}
