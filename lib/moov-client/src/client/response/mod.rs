//! Response resolution.
//!
//! Every endpoint funnels its [`RawResponse`] through [`resolve`], generic over the
//! target type. The other resolvers are thin shapes around it:
//!
//! - [`object_or_error`] - a value is required
//! - [`optional_or_error`] - an empty success body means `None`
//! - [`list_or_error`] - an empty or `null` success body means an empty list
//! - [`empty_or_error`] - only the status matters
//! - [`outcome_or_error`] - completed or started, depending on the status

use std::borrow::Cow;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::MoovError;

mod outcome;
pub use self::outcome::{Outcome, outcome_or_error};

/// Maximum number of body bytes kept in errors.
pub(crate) const BODY_MAX_LENGTH: usize = 1024;

/// A response as received from the server: status, headers and the whole body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns `true` when the body is absent or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// The body as text, invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The body as text, cut after [`BODY_MAX_LENGTH`] bytes.
    pub fn truncated_text(&self) -> String {
        truncate(&self.text())
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= BODY_MAX_LENGTH {
        return text.to_string();
    }
    let end = (0..=BODY_MAX_LENGTH)
        .rev()
        .find(|index| text.is_char_boundary(*index))
        .unwrap_or_default();
    format!("{}... (truncated)", text.get(..end).unwrap_or_default())
}

/// The structured error body returned by the platform.
///
/// ```json
/// { "error": "invalid amount", "code": "validation", "details": { "amount": "must be positive" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[display("{error}")]
pub struct ApiErrorBody {
    /// Human readable message.
    pub error: String,
    /// Machine readable code, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Field level details, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Field level details of an [`ApiErrorBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    /// Messages keyed by field name.
    Fields(IndexMap<String, serde_json::Value>),
    /// A list of detail entries.
    List(Vec<serde_json::Value>),
    /// A single free-form detail.
    Text(String),
}

/// Turns a non-2xx response into an error.
///
/// A body matching [`ApiErrorBody`] gives [`MoovError::Api`], anything else
/// [`MoovError::Http`] with the truncated body.
pub fn error_from_response(response: &RawResponse) -> MoovError {
    let status = response.status();
    match serde_json::from_slice::<ApiErrorBody>(response.body()) {
        Ok(body) => MoovError::Api { status, body },
        Err(err) => {
            if !response.is_empty() {
                warn!(%status, %err, "error body is not a structured API error");
            }
            MoovError::Http {
                status,
                body: response.truncated_text(),
            }
        }
    }
}

pub(crate) fn decode<T>(response: &RawResponse) -> Result<T, MoovError>
where
    T: DeserializeOwned,
{
    let deserializer = &mut serde_json::Deserializer::from_slice(response.body());
    serde_path_to_error::deserialize(deserializer).map_err(|err| MoovError::MalformedResponse {
        status: response.status(),
        path: err.path().to_string(),
        error: err.into_inner(),
        body: response.truncated_text(),
    })
}

/// Resolves a response into an optional value of type `T`.
///
/// # Errors
///
/// Non-2xx responses become [`MoovError::Api`] or [`MoovError::Http`]; a body that
/// does not decode into `T` becomes [`MoovError::MalformedResponse`].
pub fn resolve<T>(response: RawResponse) -> Result<Option<T>, MoovError>
where
    T: DeserializeOwned,
{
    if !response.is_success() {
        return Err(error_from_response(&response));
    }
    if response.is_empty() {
        return Ok(None);
    }
    decode(&response).map(Some)
}

/// Resolves a response that must carry a value.
///
/// # Errors
///
/// Same as [`resolve`]; an empty success body is a [`MoovError::MalformedResponse`].
pub fn object_or_error<T>(response: RawResponse) -> Result<T, MoovError>
where
    T: DeserializeOwned,
{
    if !response.is_success() {
        return Err(error_from_response(&response));
    }
    decode(&response)
}

/// Resolves a response that may carry a value.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn optional_or_error<T>(response: RawResponse) -> Result<Option<T>, MoovError>
where
    T: DeserializeOwned,
{
    resolve(response)
}

/// Resolves a list response, in server order.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn list_or_error<T>(response: RawResponse) -> Result<Vec<T>, MoovError>
where
    T: DeserializeOwned,
{
    let items = resolve::<Option<Vec<T>>>(response)?;
    Ok(items.flatten().unwrap_or_default())
}

/// Checks the status of a response and drops its body.
///
/// # Errors
///
/// Non-2xx responses become [`MoovError::Api`] or [`MoovError::Http`].
pub fn empty_or_error(response: RawResponse) -> Result<(), MoovError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(error_from_response(&response))
    }
}
