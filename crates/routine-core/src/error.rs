//! Error types for the routine pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::JobStatus;

/// Comprehensive error type for all pipeline operations.
#[derive(Error, Debug)]
pub enum RoutineError {
    /// A request field is malformed or out of range
    #[error("Invalid input for field '{field}': {reason}")]
    Validation { field: String, reason: String },
    /// A call to the remote generation service failed at the transport level
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
    /// The generation job did not reach a completed state
    #[error("Generation failed: {reason}")]
    GenerationFailed { reason: GenerationFailure },
    /// Record store unreachable or write rejected
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A blocking store task panicked or was cancelled
    #[error("Store task failed: {source}")]
    StoreTask {
        #[source]
        source: tokio::task::JoinError,
    },
    /// Record not found for the given ID
    #[error("Plan record with ID {id} not found")]
    NotFound { id: u64 },
    /// The mail service rejected or could not receive a message
    #[error("Delivery failed: {message}")]
    Delivery { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Why a generation job produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The job reached a terminal status other than completed
    Terminal(JobStatus),
    /// The poll deadline elapsed; carries the last status observed
    TimedOut { last_status: JobStatus },
    /// The job completed but the newest message is not an assistant reply
    MissingReply,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationFailure::Terminal(status) => {
                write!(f, "job ended with status '{}'", status.as_str())
            }
            GenerationFailure::TimedOut { last_status } => write!(
                f,
                "job did not complete before the deadline (last status '{}')",
                last_status.as_str()
            ),
            GenerationFailure::MissingReply => {
                write!(f, "job completed without an assistant reply")
            }
        }
    }
}

/// Builder for creating persistence errors with optional context.
pub struct PersistenceErrorBuilder {
    message: String,
}

impl PersistenceErrorBuilder {
    /// Create a new persistence error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> RoutineError {
        RoutineError::Persistence {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct ValidationErrorBuilder {
    field: String,
}

impl ValidationErrorBuilder {
    /// Create a new validation error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> RoutineError {
        RoutineError::Validation {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl RoutineError {
    /// Creates a builder for persistence errors.
    pub fn persistence(message: impl Into<String>) -> PersistenceErrorBuilder {
        PersistenceErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn validation(field: impl Into<String>) -> ValidationErrorBuilder {
        ValidationErrorBuilder::new(field)
    }

    /// Transport error without an underlying HTTP error, e.g. a malformed
    /// response body or an unexpected status code.
    pub fn transport(message: impl Into<String>) -> Self {
        RoutineError::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn generation_failed(reason: GenerationFailure) -> Self {
        RoutineError::GenerationFailed { reason }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        RoutineError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn join(source: tokio::task::JoinError) -> Self {
        RoutineError::StoreTask { source }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| RoutineError::persistence(message).with_source(e))
    }
}

/// Specialized extension trait for HTTP-related Results.
pub trait TransportResultExt<T> {
    /// Map HTTP client errors with a message.
    fn transport_context(self, message: &str) -> Result<T>;
}

impl<T> TransportResultExt<T> for std::result::Result<T, reqwest::Error> {
    fn transport_context(self, message: &str) -> Result<T> {
        self.map_err(|e| RoutineError::Transport {
            message: format!("{message}: {e}"),
            source: Some(e),
        })
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RoutineError>;
