use thiserror::Error;

/// Convenient result alias for the searoute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Request input was malformed or out of range.
    #[error("invalid request: {message}")]
    Validation { message: String },

    /// Raised when a port code is absent from the catalog or inactive.
    #[error("unknown port code: {code}{}", format_suggestions(.suggestions))]
    PortNotFound {
        code: String,
        suggestions: Vec<String>,
    },

    /// Computation exceeded the request deadline.
    #[error("route calculation exceeded its deadline")]
    DeadlineExceeded,

    /// Raised when the search observes its cancellation signal.
    #[error("route calculation was cancelled")]
    Cancelled,

    /// The compute semaphore could not be obtained within the wait budget.
    #[error("route planner is overloaded; retry with backoff")]
    Overloaded,

    /// The catalog produced a disconnected or inconsistent graph.
    #[error("port graph build failed: {message}")]
    GraphBuildFailed { message: String },

    /// A repository or cache backend call failed.
    #[error("backend unavailable: {backend}: {message}")]
    BackendUnavailable { backend: String, message: String },

    /// Raised when port catalog data fails validation on load.
    #[error("invalid port data: {message}")]
    PortDataValidation { message: String },

    /// Raised when two catalog rows share a UN/LOCODE.
    #[error("duplicate port code encountered: {code}")]
    DuplicatePortCode { code: String },

    /// Raised when the catalog database lacks the expected tables/columns.
    #[error("unsupported catalog schema; expected a Ports table")]
    UnsupportedSchema,

    /// Raised when a tariff or risk table file fails to parse.
    #[error("failed to load tables from {path}: {message}")]
    TableLoad { path: String, message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// `true` when the error represents a client-side problem that should
    /// not be retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::PortNotFound { .. }
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
