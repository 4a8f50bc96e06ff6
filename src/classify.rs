use std::fmt;
use std::time::Duration;

use crate::runner::ExecutionOutcome;

pub const NO_CODE_SENTINEL: &str = "⚠ No code detected.";
pub const NO_OUTPUT_SENTINEL: &str = "⚠ No output produced.";

/// Normalized classification of one execution attempt.
///
/// Every condition renders to readable text through `Display`; failures
/// carry a `⚠` marker so a human or a downstream renderer can separate
/// success from failure without parsing exit codes. Build and runtime
/// failures share a variant: the and-then pipeline reports whichever
/// stage failed through the same stderr channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    EmptyInput,
    UnsupportedLanguage(String),
    RestrictedEnvironment(String),
    LaunchFailure(String),
    TimedOut {
        limit: Duration,
        partial_stdout: String,
    },
    /// Build or runtime failure: stderr only, no regular output.
    ErrorOnly(String),
    /// The program produced output and also wrote diagnostics to stderr.
    /// No attempt is made to judge whether the diagnostics were fatal.
    OutputWithDiagnostics { stdout: String, stderr: String },
    /// Ran to completion with nothing on either stream.
    Silent,
    Output(String),
}

/// Maps a runner outcome to its verdict. Pure; the empty-input,
/// unsupported-language and restricted-environment verdicts are produced
/// by the dispatcher before a runner outcome ever exists.
pub fn classify(outcome: &ExecutionOutcome, limit: Duration) -> Verdict {
    let stdout = outcome.stdout.trim();
    let stderr = outcome.stderr.trim();

    // Timeout wins over everything else; partial output is still shown.
    if outcome.timed_out {
        return Verdict::TimedOut {
            limit,
            partial_stdout: stdout.to_string(),
        };
    }
    if outcome.launch_failed {
        return Verdict::LaunchFailure(stderr.to_string());
    }
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, false) => Verdict::ErrorOnly(stderr.to_string()),
        (false, false) => Verdict::OutputWithDiagnostics {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        },
        (true, true) => Verdict::Silent,
        (false, true) => Verdict::Output(stdout.to_string()),
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::EmptyInput => f.write_str(NO_CODE_SENTINEL),
            Verdict::UnsupportedLanguage(id) => {
                write!(f, "⚠ Language {id} not supported.")
            }
            Verdict::RestrictedEnvironment(id) => {
                write!(
                    f,
                    "⚠ Language {id} cannot run in this environment; only python is available."
                )
            }
            Verdict::LaunchFailure(error) => write!(f, "⚠ Execution error: {error}"),
            Verdict::TimedOut {
                limit,
                partial_stdout,
            } => {
                write!(
                    f,
                    "⚠ Execution timed out after {} seconds.",
                    limit.as_secs()
                )?;
                if !partial_stdout.is_empty() {
                    write!(f, "\nPartial output:\n{partial_stdout}")?;
                }
                Ok(())
            }
            Verdict::ErrorOnly(stderr) => write!(f, "⚠ Error:\n{stderr}"),
            Verdict::OutputWithDiagnostics { stdout, stderr } => {
                write!(f, "{stdout}\n⚠ Errors:\n{stderr}")
            }
            Verdict::Silent => f.write_str(NO_OUTPUT_SENTINEL),
            Verdict::Output(stdout) => f.write_str(stdout),
        }
    }
}
