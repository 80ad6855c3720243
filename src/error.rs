//! Error types for the session store, the context codec and the dialog.

use chrono::Duration;
use thiserror::Error;

/// Errors reported by a [`SessionStore`](crate::SessionStore).
///
/// Backend failures carry the stringified driver error, matching how the
/// SeaORM store maps every `DbErr`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session row exists for the principal.
    #[error("session not found")]
    NotFound,

    /// The session was idle longer than the store's TTL. The row has already
    /// been removed when this is returned.
    #[error("session expired")]
    Expired,

    /// Database errors.
    #[error("session backend error: {0}")]
    Backend(String),

    /// The context map could not be serialized for storage.
    #[error("session encode error: {0}")]
    Encode(String),

    /// The stored row could not be turned back into a state and context.
    #[error("session decode error: {0}")]
    Decode(String),
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        SessionError::Decode(err.to_string())
    }
}

/// Errors produced when a context map cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("missing key `{0}`")]
    MissingKey(String),

    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("unsupported context version `{0}`")]
    UnsupportedVersion(String),

    #[error("invalid number for `{key}`: `{value}`")]
    InvalidNumber { key: String, value: String },

    #[error("invalid timestamp for `{key}`: `{value}`")]
    InvalidTimestamp { key: String, value: String },

    #[error("invalid event type `{0}`")]
    InvalidEventType(String),

    #[error("invalid option count `{0}`")]
    InvalidOptionCount(String),
}

/// Reasons a user input is rejected in the state awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("question is longer than {max} characters")]
    QuestionTooLong { max: usize },

    #[error("unknown event type `{0}`")]
    UnknownEventType(String),

    #[error("at least {min} options are required")]
    TooFewOptions { min: usize },

    #[error("at most {max} options are allowed")]
    TooManyOptions { max: usize },

    #[error("option `{0}` is listed more than once")]
    DuplicateOption(String),

    #[error("option is longer than {max} characters")]
    OptionTooLong { max: usize },

    #[error("deadline `{0}` could not be parsed")]
    UnparsableDeadline(String),

    #[error("deadline must be in the future")]
    DeadlineNotInFuture,

    #[error("a button press was expected")]
    ExpectedButton,

    #[error("a text message was expected")]
    ExpectedText,

    #[error("unknown confirmation `{0}`")]
    UnknownConfirmation(String),
}

impl ValidationError {
    /// Localizer key of the error prompt shown for this rejection.
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::EmptyQuestion => "error.question_empty",
            ValidationError::QuestionTooLong { .. } => "error.question_too_long",
            ValidationError::UnknownEventType(_) => "error.event_type_unknown",
            ValidationError::TooFewOptions { .. } => "error.options_too_few",
            ValidationError::TooManyOptions { .. } => "error.options_too_many",
            ValidationError::DuplicateOption(_) => "error.option_duplicate",
            ValidationError::OptionTooLong { .. } => "error.option_too_long",
            ValidationError::UnparsableDeadline(_) => "error.deadline_format",
            ValidationError::DeadlineNotInFuture => "error.deadline_past",
            ValidationError::ExpectedButton => "error.use_buttons",
            ValidationError::ExpectedText => "error.expected_text",
            ValidationError::UnknownConfirmation(_) => "error.confirmation_unknown",
        }
    }
}

/// Failures reported by a [`ChatTransport`](crate::ChatTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("message not found")]
    NotFound,

    #[error("message is too old to be deleted")]
    TooOld,

    #[error("transport error: {0}")]
    Other(String),
}

/// Failure reported by an [`EventManager`](crate::EventManager).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event creation failed: {0}")]
pub struct EventCreationError(pub String);

/// Infrastructure failures the dialog cannot recover from on its own.
///
/// Missing, expired and corrupt sessions are not errors at this level; the
/// dialog answers them with a "no active session" outcome.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to send message: {0}")]
    Transport(#[from] TransportError),
}
