use http::StatusCode;

use super::auth::AuthenticationError;
use super::response::ApiErrorBody;

/// Errors that can occur when calling the Moov API.
///
/// The first five variants form the call taxonomy: [`Transport`](Self::Transport),
/// [`Http`](Self::Http), [`Api`](Self::Api), [`MalformedResponse`](Self::MalformedResponse)
/// and [`MalformedPath`](Self::MalformedPath). The remaining variants are raised while
/// building the client or a request, before anything reaches the network.
///
/// Endpoint wrappers attach the operation they were performing with
/// [`Context`](Self::Context); use [`MoovError::root_cause`] to look through it.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum MoovError {
    /// Network failure, cancelled call or expired deadline.
    ///
    /// Never carries a status code: the server did not answer.
    #[display("Transport error while calling {operation}: {source}")]
    #[from(skip)]
    Transport {
        /// The endpoint being called, as `METHOD template`.
        operation: String,
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// Non-2xx status whose body is not a structured error.
    #[display("HTTP error {status}: {body}")]
    #[from(skip)]
    Http {
        /// The response status code.
        status: StatusCode,
        /// The raw response body as text, cut after 1024 bytes and then
        /// suffixed with `... (truncated)`.
        body: String,
    },

    /// Non-2xx status with a structured error body.
    #[display("API error {status}: {body}")]
    #[from(skip)]
    Api {
        /// The response status code.
        status: StatusCode,
        /// The decoded error payload.
        body: ApiErrorBody,
    },

    /// Successful status, but the body does not decode into the expected type.
    #[display("Failed to deserialize JSON at '{path}' ({status}): {error}\n{body}")]
    #[from(skip)]
    MalformedResponse {
        /// The response status code.
        status: StatusCode,
        /// JSON path where decoding failed.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The response body, truncated.
        body: String,
    },

    /// Path template and arguments cannot form the described path.
    #[display("Path '{template}' {reason}")]
    #[from(skip)]
    MalformedPath {
        /// The path template.
        template: String,
        /// What is wrong with the arguments.
        reason: MalformedPathReason,
    },

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// Invalid URI parts when assembling the base URL.
    HttpError(http::Error),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Credentials cannot be turned into an `Authorization` header.
    Authentication(AuthenticationError),

    /// Request payload serialization failed.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Invalid base path configuration.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// Client configuration is incomplete or inconsistent.
    #[display("Configuration error: {message}")]
    #[from(skip)]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An error annotated with the operation that produced it.
    #[display("{context}: {source}")]
    #[from(skip)]
    Context {
        /// What the client was doing, e.g. `listing sweeps`.
        context: String,
        /// The wrapped error.
        source: Box<MoovError>,
    },
}

impl MoovError {
    /// Wraps this error with the operation it interrupted.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping every [`Context`](Self::Context) layer.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the HTTP status code the server answered with, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self.root_cause() {
            Self::Http { status, .. }
            | Self::Api { status, .. }
            | Self::MalformedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the server answered `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns the structured error payload, for [`Api`](Self::Api) errors.
    pub fn api_error(&self) -> Option<&ApiErrorBody> {
        match self.root_cause() {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Why an [`Endpoint`](super::Endpoint) cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MalformedPathReason {
    /// Placeholder and argument counts differ.
    #[display("expects {expected} arguments, got {actual}")]
    ArgumentCount {
        /// Number of placeholders in the template.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// An argument is `.` or `..`, which URL normalization would remove.
    #[display("cannot use '{argument}' as argument {position}")]
    DotSegment {
        /// Zero-based position of the argument.
        position: usize,
        /// The offending argument.
        argument: String,
    },
}

/// Adds operation context to the error side of a `Result`.
pub(crate) trait ResultExt<T> {
    fn context(self, context: &str) -> Result<T, MoovError>;
}

impl<T> ResultExt<T> for Result<T, MoovError> {
    fn context(self, context: &str) -> Result<T, MoovError> {
        self.map_err(|err| err.context(context))
    }
}
