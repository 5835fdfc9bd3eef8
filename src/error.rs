//! Error types for the loan wizard.

/// Top-level error type for the wizard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Durable session-slot errors.
///
/// The gateway fails loudly on an unavailable or corrupt slot; callers degrade
/// to "no saved session" instead of crashing the wizard.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("Corrupt session snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Failures during the two-phase remote submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Transport-level failure or timeout. Carries a generic per-call message.
    #[error("{message}")]
    Network { message: String },

    /// Structured error response from the endpoint, with the server-supplied
    /// message and optional error code.
    #[error("{message}")]
    Remote {
        message: String,
        code: Option<String>,
    },

    /// The endpoint returned 2xx but the body could not be interpreted as a
    /// success (unparseable, or a non-"success" status value).
    #[error("{message}")]
    InvalidResponse { message: String },
}

impl SubmitError {
    /// The user-facing message shown in the retry banner.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::Remote { message, .. }
            | Self::InvalidResponse { message } => message,
        }
    }
}

/// Field-level validation errors for the contact step.
///
/// Surfaced inline next to the offending input; never stored in the state
/// container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Phone must be 10 digits (numbers only)")]
    InvalidPhone,
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
