//! Error type shared by every client operation.
//!
//! A [`LogError`] always carries a machine-readable [`ErrorCode`], a message,
//! and the request id the service assigned to the failing call. The request
//! id is empty when the failure happened on the client side, before or
//! without reaching the service; the submission retry policy keys off that
//! distinction.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed cause attached to a [`LogError`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Error codes raised by the client or forwarded from the service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The endpoint could not be turned into a request URI.
    EndpointInvalid,
    /// A caller-supplied argument was unusable.
    InvalidParameter,
    /// Record count or serialized size exceeds the service limits.
    InvalidLogSize,
    /// The payload could not be encoded.
    EncodingException,
    /// The transport failed before a response was obtained.
    RequestError,
    /// The response body was empty or not valid UTF-8/JSON.
    BadResponse,
    /// An error response lacked the `errorCode`/`errorMessage` fields.
    InvalidErrorResponse,
    /// Code reported verbatim by the service.
    Server(String),
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::EndpointInvalid => "EndpointInvalid",
            Self::InvalidParameter => "InvalidParameter",
            Self::InvalidLogSize => "InvalidLogSize",
            Self::EncodingException => "EncodingException",
            Self::RequestError => "RequestError",
            Self::BadResponse => "BadResponse",
            Self::InvalidErrorResponse => "InvalidErrorResponse",
            Self::Server(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a client operation.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct LogError {
    code: ErrorCode,
    message: String,
    request_id: String,
    #[source]
    source: Option<BoxedCause>,
}

impl LogError {
    /// Build an error raised on the client side (empty request id).
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: String::new(),
            source: None,
        }
    }

    /// Build an error the service answered with.
    pub fn from_server(
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code: ErrorCode::Server(code.into()),
            message: message.into(),
            request_id: request_id.into(),
            source: None,
        }
    }

    /// Attach the request id taken from the response headers.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Wrap a transport failure.
    pub(crate) fn transport(err: std::io::Error) -> Self {
        Self::new(
            ErrorCode::RequestError,
            format!("Web request failed: {err}"),
        )
        .with_source(err)
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Request id assigned by the service, empty for client-side failures.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// True when the service processed and rejected the request.
    pub fn is_server_side(&self) -> bool {
        !self.request_id.is_empty()
    }
}
