use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for sbqueue operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    body: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No messages available within the receive timeout (204)
    NoMessagesAvailable,

    /// The service rejected the request as malformed (400)
    BadRequest,

    /// The shared access signature was rejected (401)
    NotAuthorized,

    /// No message exists for the given message id or lock token (404)
    MessageNotFound,

    /// The queue does not exist (410)
    QueueNotFound,

    /// The service failed internally (500)
    InternalError,

    /// The service answered with a status outside the known set
    UnknownStatus,

    /// Request cannot be built (invalid uri, header name or value, etc.)
    RequestInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Unexpected errors (network, I/O, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Prefix the message with a short context, keeping kind and source.
    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the status code returned by the service, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Get the raw response body returned by the service, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

// Convenience constructors
impl Error {
    /// Create an error from a non-success status code and the raw response body.
    ///
    /// 200 and 201 are not errors and must be filtered out by the caller.
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        let (kind, message) = match status.as_u16() {
            204 => (
                ErrorKind::NoMessagesAvailable,
                "No messages available within the specified timeout period".to_string(),
            ),
            400 => (ErrorKind::BadRequest, "Bad request".to_string()),
            401 => (ErrorKind::NotAuthorized, "Authorization failure".to_string()),
            404 => (
                ErrorKind::MessageNotFound,
                "No message was found with the specified MessageId or LockToken".to_string(),
            ),
            410 => (
                ErrorKind::QueueNotFound,
                "Specified queue or subscription does not exist".to_string(),
            ),
            500 => (ErrorKind::InternalError, "Internal error".to_string()),
            code => (
                ErrorKind::UnknownStatus,
                format!("Unknown status {code} with body {body}"),
            ),
        };

        Self {
            kind,
            message,
            status: Some(status),
            body: Some(body),
            source: None,
        }
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NoMessagesAvailable => write!(f, "no messages available"),
            ErrorKind::BadRequest => write!(f, "bad request"),
            ErrorKind::NotAuthorized => write!(f, "not authorized"),
            ErrorKind::MessageNotFound => write!(f, "message not found"),
            ErrorKind::QueueNotFound => write!(f, "queue not found"),
            ErrorKind::InternalError => write!(f, "internal error"),
            ErrorKind::UnknownStatus => write!(f, "unknown status"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
