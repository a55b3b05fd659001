use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use headers::ContentType;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;
use url::Url;

use super::{Endpoint, MoovError};

mod args;
pub use self::args::{
    IDEMPOTENCY_KEY_HEADER, WAIT_FOR_HEADER, accept_json, count, header, idempotency_key,
    json_body, query, skip, timeout, wait_for_rail_response,
};

mod execution;

/// A modification applied to a [`CallBuilder`] before dispatch.
///
/// Implementations are pure data transformations: they never perform I/O, so a
/// request can be assembled and inspected without a network. Every closure
/// `Fn(&mut CallBuilder) -> Result<(), MoovError>` is an `ApplyCall`.
pub trait ApplyCall: Send + Sync {
    /// Applies the modification.
    ///
    /// # Errors
    ///
    /// Returns an error when the option carries data that cannot become part of a request,
    /// e.g. an invalid header name or an unserializable body.
    fn apply(&self, call: &mut CallBuilder) -> Result<(), MoovError>;
}

impl<F> ApplyCall for F
where
    F: Fn(&mut CallBuilder) -> Result<(), MoovError> + Send + Sync,
{
    fn apply(&self, call: &mut CallBuilder) -> Result<(), MoovError> {
        self(call)
    }
}

/// A shareable call option.
///
/// Options are applied left to right; options writing the same header or query
/// parameter resolve last-write-wins.
#[derive(Clone)]
pub struct CallArg(Arc<dyn ApplyCall>);

impl CallArg {
    /// Wraps any [`ApplyCall`] implementation.
    pub fn new(apply: impl ApplyCall + 'static) -> Self {
        Self(Arc::new(apply))
    }

    /// Applies this option to a call.
    ///
    /// # Errors
    ///
    /// Propagates the option's error.
    pub fn apply(&self, call: &mut CallBuilder) -> Result<(), MoovError> {
        self.0.apply(call)
    }
}

impl fmt::Debug for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallArg(..)")
    }
}

/// Encoded request body together with its content type.
#[derive(Clone, derive_more::Debug)]
pub struct CallBody {
    content_type: ContentType,
    #[debug(ignore)]
    data: Bytes,
}

impl CallBody {
    /// Encodes a value as an `application/json` body.
    ///
    /// # Errors
    ///
    /// Returns [`MoovError::Serialization`] if the value cannot be serialized.
    pub fn json<T>(value: &T) -> Result<Self, MoovError>
    where
        T: Serialize + ?Sized,
    {
        Self::encode_json(value).map_err(|message| MoovError::Serialization { message })
    }

    /// Same as [`CallBody::json`], with the failure as a clonable message.
    pub(crate) fn encode_json<T>(value: &T) -> Result<Self, String>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value)
            .map_err(|err| format!("Failed to serialize JSON body: {err}"))?;
        Ok(Self {
            content_type: ContentType::json(),
            data: Bytes::from(data),
        })
    }

    /// Wraps pre-encoded bytes.
    pub fn raw(data: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// The content type sent with the body.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// The description of one request, built incrementally by [`CallArg`]s.
///
/// Holds the [`Endpoint`], the query parameters (insertion ordered), the headers,
/// an optional body and an optional deadline. Dispatching consumes it.
#[derive(Clone, derive_more::Debug)]
pub struct CallBuilder {
    endpoint: Endpoint,
    params: IndexMap<String, String>,
    headers: HeaderMap,
    body: Option<CallBody>,
    timeout: Option<Duration>,
}

impl CallBuilder {
    /// Creates an empty call for the endpoint.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: IndexMap::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a call and applies every option in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing option and returns its error.
    pub fn prepare<I>(endpoint: Endpoint, args: I) -> Result<Self, MoovError>
    where
        I: IntoIterator<Item = CallArg>,
    {
        let mut call = Self::new(endpoint);
        for arg in args {
            arg.apply(&mut call)?;
        }
        trace!(?call, "call prepared");
        Ok(call)
    }

    /// Sets a query parameter, replacing any previous value for the same name.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Sets a header, replacing any previous value for the same name.
    ///
    /// # Errors
    ///
    /// Fails if the name or the value is not a valid HTTP header component.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), MoovError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Sets the request body, replacing any previous one.
    pub fn set_body(&mut self, body: CallBody) {
        self.body = Some(body);
    }

    /// Sets the deadline of this call.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// The endpoint this call targets.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        self.endpoint.method()
    }

    /// The query parameters, in insertion order.
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// Returns the value of one query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The headers set by options.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&CallBody> {
        self.body.as_ref()
    }

    /// The per-call deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Renders the query parameters as an `application/x-www-form-urlencoded` string.
    ///
    /// # Errors
    ///
    /// Fails if the parameters cannot be encoded.
    pub fn query_string(&self) -> Result<String, MoovError> {
        let pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let query = serde_urlencoded::to_string(pairs)?;
        Ok(query)
    }

    /// Resolves the endpoint against a base URL and appends the query string.
    ///
    /// # Errors
    ///
    /// Fails with [`MoovError::MalformedPath`] if the endpoint path cannot be resolved,
    /// or with a URL error if the result is not a valid URL.
    pub fn build_url(&self, base_url: &Url) -> Result<Url, MoovError> {
        let path = self.endpoint.resolve_path()?;
        let url = format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = url.parse::<Url>()?;

        if !self.params.is_empty() {
            let query_string = self.query_string()?;
            url.set_query(Some(&query_string));
        }

        Ok(url)
    }
}
