//! Error taxonomy for the benchmark harness

use thiserror::Error;

/// Fatal harness errors. Anything of this kind aborts the run with a
/// non-zero exit code; per-cell fetch failures are [`FetchError`]s and
/// never surface here.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to write results: {0}")]
    Report(String),
}

/// Failure of a single access-method invocation.
///
/// Carries the failing library surface as `kind` plus the error message,
/// so a failed cell still produces a useful CSV row. Fetch failures are
/// values, never panics; the runner records them and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: String,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}
