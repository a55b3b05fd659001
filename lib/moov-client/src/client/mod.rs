use url::Url;

mod builder;
pub use self::builder::{ENV_HOST, ENV_PUBLIC_KEY, ENV_SECRET_KEY, MoovClientBuilder};

mod auth;
pub use self::auth::{Authentication, AuthenticationError, SecureString};

mod endpoint;
pub use self::endpoint::Endpoint;

mod call;
pub use self::call::{
    ApplyCall, CallArg, CallBody, CallBuilder, IDEMPOTENCY_KEY_HEADER, WAIT_FOR_HEADER,
    accept_json, count, header, idempotency_key, json_body, query, skip, timeout,
    wait_for_rail_response,
};

mod response;
pub use self::response::{
    ApiErrorBody, ErrorDetails, Outcome, RawResponse, empty_or_error, error_from_response,
    list_or_error, object_or_error, optional_or_error, outcome_or_error, resolve,
};

mod error;
pub(crate) use self::error::ResultExt;
pub use self::error::{MalformedPathReason, MoovError};

/// Client for the Moov API.
///
/// Holds the transport, the base URL and the credentials. It is immutable once built
/// and cheap to clone; clones share the connection pool, so one client can serve any
/// number of concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use moov_client::{ListSweepsFilter, MoovClient, SweepStatus};
///
/// # async fn example() -> Result<(), moov_client::MoovError> {
/// let client = MoovClient::builder()
///     .with_credentials("public-key", "secret-key")
///     .build()?;
///
/// let sweeps = client
///     .list_sweeps(
///         "account-id",
///         "wallet-id",
///         [
///             ListSweepsFilter::status(SweepStatus::Accruing),
///             ListSweepsFilter::skip(0),
///             ListSweepsFilter::count(10),
///         ],
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MoovClient {
    client: reqwest::Client,
    base_url: Url,
    authentication: Option<Authentication>,
}

impl MoovClient {
    /// Creates a builder with the default configuration.
    pub fn builder() -> MoovClientBuilder {
        MoovClientBuilder::default()
    }

    /// Creates a client from `MOOV_PUBLIC_KEY`, `MOOV_SECRET_KEY` and `MOOV_HOST`.
    ///
    /// # Errors
    ///
    /// See [`MoovClientBuilder::from_env`] and [`MoovClientBuilder::build`].
    pub fn from_env() -> Result<Self, MoovError> {
        MoovClientBuilder::from_env()?.build()
    }

    /// The URL every endpoint path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs one call and returns the raw response, whatever its status.
    ///
    /// The request asks for JSON; `args` are applied after that default, in order.
    /// Dropping the returned future cancels the call.
    ///
    /// # Errors
    ///
    /// Fails with [`MoovError::MalformedPath`] before any network activity when the
    /// endpoint arguments do not match its template, with the option's error when an
    /// option cannot be applied, and with [`MoovError::Transport`] when no response
    /// could be obtained.
    pub async fn call_http<I>(&self, endpoint: Endpoint, args: I) -> Result<RawResponse, MoovError>
    where
        I: IntoIterator<Item = CallArg>,
    {
        let args = std::iter::once(accept_json()).chain(args);
        let call = CallBuilder::prepare(endpoint, args)?;
        call.exchange(&self.client, &self.base_url, self.authentication.as_ref())
            .await
    }
}
