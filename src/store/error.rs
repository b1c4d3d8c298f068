use thiserror::Error;

/// Failures talking to the remote file host.
///
/// Messages returned by the host are carried verbatim so they can be shown
/// to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The stored revision moved on since it was read.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("invalid content: {0}")]
    Decode(String),
}

impl StoreError {
    /// Taxonomy label for user-facing messages.
    pub const fn class(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::Conflict(_) => "Conflict",
            Self::Network(_) => "NetworkError",
            Self::Http { .. } => "HttpError",
            Self::Decode(_) => "DecodeError",
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Classify a non-success HTTP status with the host's message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound,
            409 => Self::Conflict(message),
            // GitHub answers 422 when the supplied sha does not match.
            422 if message.to_ascii_lowercase().contains("sha") => Self::Conflict(message),
            _ => Self::Http { status, message },
        }
    }
}
