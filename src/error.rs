//! Crate error type.

use crate::validation::ValidationError;

/// Errors surfaced by pool construction, input parsing and the search.
///
/// Search exhaustion is not an error: it is reported through
/// [`crate::ga::Outcome::Exhausted`].
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// The demand model failed validation.
    #[error("invalid demand: {}", join_messages(.0))]
    InvalidDemand(Vec<ValidationError>),
    /// The search configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The demand file could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Reading the demand file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
