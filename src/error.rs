//! Error types for the lead-intake crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what
//! went wrong. Errors are categorized by their retryability - see
//! [`Error::is_retryable`].
//!
//! Expected-empty pipeline outcomes (unrecognized subject, failed field
//! validation, duplicate detection) are not errors; they are
//! [`Outcome`](crate::pipeline::Outcome) variants. Only system faults
//! surface here.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during lead-intake operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// A field-extraction pattern failed to compile.
    #[error("invalid extraction pattern for field '{field}'")]
    InvalidPattern {
        /// The field the pattern belongs to.
        field: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Message decoding errors (NOT retryable - malformed content won't change)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse a raw message payload.
    #[error("failed to parse message {message_id}")]
    ParseMessage {
        /// The transport-assigned message identifier.
        message_id: String,
        /// The underlying parse error.
        #[source]
        source: mailparse::MailParseError,
    },

    /// Failed to extract a text body from a parsed message.
    #[error("failed to extract body from message {message_id}")]
    ExtractBody {
        /// The transport-assigned message identifier.
        message_id: String,
        /// The underlying parse error.
        #[source]
        source: mailparse::MailParseError,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence boundary errors (RETRYABLE - could be a transient outage)
    // ─────────────────────────────────────────────────────────────────────────
    /// The persistence boundary failed a query or insert.
    ///
    /// Propagates to the caller so the transport's own retry/backoff applies
    /// rather than silently dropping an otherwise-valid lead.
    #[error("lead store operation failed during {operation}")]
    Store {
        /// The store operation that failed.
        operation: &'static str,
        /// The underlying store error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that
    /// might succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Store { .. } => true,

            Error::InvalidConfig { .. }
            | Error::InvalidPattern { .. }
            | Error::ParseMessage { .. }
            | Error::ExtractBody { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. } | Error::InvalidPattern { .. } => {
                ErrorCategory::Configuration
            }
            Error::ParseMessage { .. } | Error::ExtractBody { .. } => ErrorCategory::Parse,
            Error::Store { .. } => ErrorCategory::Storage,
        }
    }

    /// Wraps a persistence-boundary failure.
    pub fn store(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Store {
            operation,
            source: Box::new(source),
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Message decoding errors.
    Parse,
    /// Persistence boundary errors.
    Storage,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::Storage => write!(f, "storage"),
        }
    }
}
