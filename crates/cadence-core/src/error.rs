//! Error taxonomy for calendar generation.
//!
//! Low quality is never an error: it is reported through
//! [`crate::gate::GateOutcome::Degraded`] and the artifact's `warning` field.

use thiserror::Error;

/// Rejected input. The run never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("missing required fields: {0}")]
    MissingFields(String),

    #[error("company must list at least one subreddit")]
    NoChannels,

    #[error("posts per week must be at least 1")]
    NoPosts,

    #[error("at least one persona is required")]
    NoPersonas,

    #[error("at least one keyword is required")]
    NoKeywords,

    #[error("duplicate persona username: {0:?}")]
    DuplicatePersona(String),

    #[error("duplicate keyword id: {0:?}")]
    DuplicateKeyword(String),
}

/// Failure raised by a text generator after its own retries are exhausted.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("generator request failed: {0}")]
    Request(String),

    #[error("generator returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("generator service unavailable after {attempts} attempts: {message}")]
    Exhausted { attempts: u32, message: String },

    #[error("generator returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("generator not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Whether the failure is worth retrying: rate limiting (429), service
    /// unavailable (503), or a response body reporting the model overloaded.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, body } => {
                matches!(status, 429 | 503) || body.to_ascii_lowercase().contains("overloaded")
            }
            _ => false,
        }
    }
}

/// Top-level error of a calendar run.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("failed to generate {artifact}: {source}")]
    Generation {
        artifact: String,
        #[source]
        source: GenerationError,
    },

    #[error("calendar {0} not found")]
    NotFound(String),
}
