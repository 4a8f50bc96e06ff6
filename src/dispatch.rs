use tokio_util::sync::CancellationToken;

use crate::classify::{Verdict, classify};
use crate::command::synthesize;
use crate::config::Settings;
use crate::language;
use crate::materialize::materialize;
use crate::runner;

/// One incoming execution call. Owned by that call, never persisted.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub language_id: String,
    pub source_text: String,
}

/// What goes back to the caller: the consolidated display text plus just
/// enough structure to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub display_text: String,
    /// Canonical (lowercased) language id the request resolved to.
    pub language_id: String,
    /// Whether a process was actually spawned for this request.
    pub attempted: bool,
}

impl ExecutionResult {
    fn rejected(language_id: String, verdict: Verdict) -> Self {
        Self {
            display_text: verdict.to_string(),
            language_id,
            attempted: false,
        }
    }
}

/// The code-execution dispatcher.
///
/// Holds only immutable settings and a cancellation token, so a single
/// instance serves any number of concurrent requests without locking.
/// `execute` never returns an error and never panics for user-facing
/// conditions; everything is folded into the result text.
pub struct Dispatcher {
    settings: Settings,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(settings: Settings) -> Self {
        Self::with_cancellation(settings, CancellationToken::new())
    }

    /// Ties in-flight executions to an external shutdown signal.
    pub fn with_cancellation(settings: Settings, cancel: CancellationToken) -> Self {
        Self { settings, cancel }
    }

    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let language_id = request.language_id.trim().to_lowercase();

        if request.source_text.trim().is_empty() {
            return ExecutionResult::rejected(language_id, Verdict::EmptyInput);
        }

        let Some(spec) = language::lookup(&language_id) else {
            let verdict = Verdict::UnsupportedLanguage(language_id.clone());
            return ExecutionResult::rejected(language_id, verdict);
        };

        if self.settings.restricted && spec.id != "python" {
            let verdict = Verdict::RestrictedEnvironment(language_id.clone());
            return ExecutionResult::rejected(language_id, verdict);
        }

        let source = match materialize(spec, &request.source_text) {
            Ok(source) => source,
            Err(e) => {
                // Disk trouble; surfaced as a launch failure, not a panic.
                log::error!("Failed to materialize {language_id} source: {e:#}");
                let verdict = Verdict::LaunchFailure(format!("{e:#}"));
                return ExecutionResult::rejected(language_id, verdict);
            }
        };

        let command = synthesize(spec, source.path());
        log::debug!(
            "Executing {} submission from {}",
            source.language_id(),
            source.path().display()
        );

        let outcome = runner::run(command, self.settings.timeout, &self.cancel).await;
        let verdict = classify(&outcome, self.settings.timeout);

        // `source` drops here, removing the temp directory and any build
        // artifacts alongside it.
        ExecutionResult {
            display_text: verdict.to_string(),
            language_id,
            attempted: true,
        }
    }
}
