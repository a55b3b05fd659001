use http::StatusCode;
use serde::de::DeserializeOwned;

use super::{RawResponse, decode, error_from_response};
use crate::client::MoovError;

/// Result of an operation the server may finish right away or keep processing.
///
/// `Completed` carries the full resource, `Started` a minimal handle on a resource
/// still in progress. Narrow with [`completed`](Self::completed) or
/// [`started`](Self::started); asking for the other variant returns `None`.
///
/// ```rust
/// use moov_client::Outcome;
///
/// let outcome: Outcome<u32, &str> = Outcome::Started("pending");
/// assert_eq!(outcome.completed(), None);
/// assert_eq!(outcome.started(), Some(&"pending"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<C, S> {
    /// The operation finished; the full resource.
    Completed(C),
    /// The operation was accepted and continues server side.
    Started(S),
}

impl<C, S> Outcome<C, S> {
    /// Returns the completed resource, if any.
    pub fn completed(&self) -> Option<&C> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Started(_) => None,
        }
    }

    /// Returns the started handle, if any.
    pub fn started(&self) -> Option<&S> {
        match self {
            Self::Completed(_) => None,
            Self::Started(handle) => Some(handle),
        }
    }

    /// Consumes the outcome, keeping the completed resource.
    pub fn into_completed(self) -> Option<C> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Started(_) => None,
        }
    }

    /// Consumes the outcome, keeping the started handle.
    pub fn into_started(self) -> Option<S> {
        match self {
            Self::Completed(_) => None,
            Self::Started(handle) => Some(handle),
        }
    }

    /// Returns `true` for [`Outcome::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns `true` for [`Outcome::Started`].
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Resolves a response that is either a completed resource or a started handle.
///
/// `200 OK` and `201 Created` decode into `C`, `202 Accepted` into `S`.
///
/// # Errors
///
/// Any other 2xx is a [`MoovError::Http`]; non-2xx statuses and decode failures
/// are reported as by the other resolvers.
pub fn outcome_or_error<C, S>(response: RawResponse) -> Result<Outcome<C, S>, MoovError>
where
    C: DeserializeOwned,
    S: DeserializeOwned,
{
    if !response.is_success() {
        return Err(error_from_response(&response));
    }

    match response.status() {
        StatusCode::OK | StatusCode::CREATED => decode(&response).map(Outcome::Completed),
        StatusCode::ACCEPTED => decode(&response).map(Outcome::Started),
        status => Err(MoovError::Http {
            status,
            body: response.truncated_text(),
        }),
    }
}
