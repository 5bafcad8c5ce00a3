use thiserror::Error;

/// Errors from ticket lifecycle operations.
///
/// The closed set of failure kinds the engine can produce. Callers match
/// on the kind, never on the message text.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("ticket cannot be cancelled: current status is {current}")]
    InvalidState { current: String },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat session not found")]
    SessionNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in faredesk-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    /// A guard inside a transaction observed a state that forbids the
    /// operation; the transaction was rolled back. Carries the observed
    /// state for the caller's error message.
    #[error("invalid state: {0}")]
    InvalidState(String),
}
