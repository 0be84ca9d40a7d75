//! Error types for benchmark runs.

use thiserror::Error;

/// Errors raised while measuring or reporting a benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The sampling loop never reached steady state.
    #[error("{operation}: no steady state after {abort_after} windows")]
    NonConvergence {
        /// Operation being measured.
        operation: String,
        /// Window count that triggered the abort.
        abort_after: usize,
    },

    /// An internal consistency check failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A definition could not read a parameter value while constructing an instance.
    #[error("Invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        parameter: String,
        /// Reason for invalidity.
        reason: String,
    },

    /// A workload was driven outside its legal input range.
    #[error("Workload error: {0}")]
    Workload(String),

    /// More than one registered benchmark matches a name.
    #[error("Found {count} benchmarks matching {name}")]
    AmbiguousBenchmark {
        /// Name that was looked up.
        name: String,
        /// Number of matches.
        count: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    pub(crate) fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        BenchError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchError>;
