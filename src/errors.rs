//! Error types for the ranking kernel
//!
//! Every public operation returns `RankResult<T>`. Numerical outputs are only
//! handed out on `Ok`; the one exception is the best-effort vector carried by
//! `NonConvergence`, which the caller has to pull out explicitly.

use thiserror::Error;

/// Boxed error raised by a compute backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum RankError {
    /// Structural inconsistency: out-of-range index, mismatched array lengths,
    /// counts that do not add up. Fatal, never retried.
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    /// Run parameter or per-stakeholder input outside its domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The iteration bound was hit before the tolerance was met.
    #[error("Rank did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergence {
        iterations: usize,
        residual: f64,
        best_effort: Vec<f64>,
    },

    /// Failure reported by the compute backend, passed through as-is.
    #[error("Backend '{backend}' failed to dispatch: {source}")]
    BackendDispatchFailure {
        backend: String,
        #[source]
        source: BackendError,
    },
}

pub type RankResult<T> = Result<T, RankError>;

impl RankError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        RankError::MalformedGraph(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RankError::InvalidParameter(msg.into())
    }

    /// Wrap an arbitrary backend failure.
    pub fn dispatch(backend: impl Into<String>, source: impl Into<BackendError>) -> Self {
        RankError::BackendDispatchFailure {
            backend: backend.into(),
            source: source.into(),
        }
    }

    /// True for errors a caller may retry with relaxed parameters.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RankError::NonConvergence { .. })
    }

    /// Take the best-effort rank vector out of a `NonConvergence` error.
    ///
    /// Returns `None` for every other kind, so no partial buffer escapes from
    /// a structural or backend failure.
    pub fn into_best_effort(self) -> Option<Vec<f64>> {
        match self {
            RankError::NonConvergence { best_effort, .. } => Some(best_effort),
            _ => None,
        }
    }
}

/// Fail with `MalformedGraph` unless two array lengths agree.
pub(crate) fn ensure_len(what: &str, actual: usize, expected: usize) -> RankResult<()> {
    if actual != expected {
        return Err(RankError::malformed(format!(
            "{} has length {}, expected {}",
            what, actual, expected
        )));
    }
    Ok(())
}
