//! Error types for the datebook engine.

use thiserror::Error;

/// Errors that can occur in datebook engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Recurrence expands to more than {limit} instances; narrow your recurrence range")]
    ExpansionTooLarge { limit: usize },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
