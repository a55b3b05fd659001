use std::env;
use std::fmt::Debug;
use std::time::Duration;

use http::Uri;
use http::uri::{PathAndQuery, Scheme};
use tracing::debug;
use url::Url;

use super::{Authentication, MoovClient, MoovError};

/// Environment variable holding the public half of the API key.
pub const ENV_PUBLIC_KEY: &str = "MOOV_PUBLIC_KEY";
/// Environment variable holding the secret half of the API key.
pub const ENV_SECRET_KEY: &str = "MOOV_SECRET_KEY";
/// Environment variable overriding the API host, e.g. `api.moov.io` or `http://localhost:8080`.
pub const ENV_HOST: &str = "MOOV_HOST";

const DEFAULT_HOST: &str = "api.moov.io";
const DEFAULT_USER_AGENT: &str = concat!("moov-client-rust/", env!("CARGO_PKG_VERSION"));

/// Builder for [`MoovClient`].
///
/// # Default Configuration
///
/// - **Scheme**: HTTPS
/// - **Host**: `api.moov.io`
/// - **Port**: 443
/// - **Base path**: none
/// - **Authentication**: none
/// - **Timeout**: none, calls wait until the transport gives up or the future is dropped
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use moov_client::MoovClient;
///
/// # fn example() -> Result<(), moov_client::MoovError> {
/// let client = MoovClient::builder()
///     .with_credentials("public-key", "secret-key")
///     .with_timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MoovClientBuilder {
    client: Option<reqwest::Client>,
    scheme: Scheme,
    host: String,
    port: Option<u16>,
    base_path: Option<PathAndQuery>,
    authentication: Option<Authentication>,
    timeout: Option<Duration>,
    user_agent: String,
}

impl MoovClientBuilder {
    /// Creates a builder configured from the process environment.
    ///
    /// Reads [`ENV_PUBLIC_KEY`] and [`ENV_SECRET_KEY`] (both or neither) and the
    /// optional [`ENV_HOST`]. A host containing `://` is parsed as a full base URL.
    ///
    /// # Errors
    ///
    /// Returns [`MoovError::Configuration`] when only one key is set, and URL errors
    /// for an unparsable host.
    pub fn from_env() -> Result<Self, MoovError> {
        let public_key = env::var(ENV_PUBLIC_KEY).ok().filter(|key| !key.is_empty());
        let secret_key = env::var(ENV_SECRET_KEY).ok().filter(|key| !key.is_empty());
        let host = env::var(ENV_HOST).ok().filter(|host| !host.is_empty());
        Self::from_values(public_key, secret_key, host)
    }

    fn from_values(
        public_key: Option<String>,
        secret_key: Option<String>,
        host: Option<String>,
    ) -> Result<Self, MoovError> {
        let mut builder = Self::default();

        builder = match (public_key, secret_key) {
            (Some(public_key), Some(secret_key)) => {
                builder.with_credentials(public_key, secret_key)
            }
            (None, None) => builder,
            (Some(_), None) => {
                return Err(MoovError::Configuration {
                    message: format!("{ENV_PUBLIC_KEY} is set but {ENV_SECRET_KEY} is missing"),
                });
            }
            (None, Some(_)) => {
                return Err(MoovError::Configuration {
                    message: format!("{ENV_SECRET_KEY} is set but {ENV_PUBLIC_KEY} is missing"),
                });
            }
        };

        if let Some(host) = host {
            builder = if host.contains("://") {
                builder.with_base_url(&host)?
            } else {
                builder.with_host(host)
            };
        }

        debug!(?builder, "client configuration loaded from environment");
        Ok(builder)
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails if the base URL cannot be assembled from scheme, host, port and base path,
    /// or if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<MoovClient, MoovError> {
        let Self {
            client,
            scheme,
            host,
            port,
            base_path,
            authentication,
            timeout,
            user_agent,
        } = self;

        let authority = match port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };
        let builder = Uri::builder().scheme(scheme).authority(authority);
        let builder = if let Some(path) = &base_path {
            builder.path_and_query(path.path())
        } else {
            builder.path_and_query("/")
        };
        let base_uri = builder.build()?;
        let base_url = Url::parse(&base_uri.to_string())?;

        let client = match client {
            Some(client) => client,
            None => {
                let builder = reqwest::Client::builder().user_agent(user_agent);
                let builder = match timeout {
                    Some(timeout) => builder.timeout(timeout),
                    None => builder,
                };
                builder.build().map_err(|err| MoovError::Configuration {
                    message: format!("cannot create HTTP client: {err}"),
                })?
            }
        };

        Ok(MoovClient {
            client,
            base_url,
            authentication,
        })
    }

    /// Sets the HTTP scheme, HTTPS by default.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the hostname or IP address of the API server.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port, by default the scheme's standard port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the base path prepended to every endpoint path.
    ///
    /// # Errors
    ///
    /// Returns [`MoovError::InvalidBasePath`] if the path cannot be parsed as a URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, MoovError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| MoovError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Sets scheme, host, port and base path from a single URL.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be parsed, has no host, or uses an unsupported scheme.
    pub fn with_base_url(self, base_url: &str) -> Result<Self, MoovError> {
        let url = Url::parse(base_url)?;
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => {
                return Err(MoovError::Configuration {
                    message: format!("unsupported scheme '{other}' in {base_url}"),
                });
            }
        };
        let Some(host) = url.host_str() else {
            return Err(MoovError::Configuration {
                message: format!("missing host in {base_url}"),
            });
        };

        let mut builder = self.with_scheme(scheme).with_host(host);
        if let Some(port) = url.port() {
            builder = builder.with_port(port);
        }
        if url.path() != "/" {
            builder = builder.with_base_path(url.path().trim_end_matches('/'))?;
        }
        Ok(builder)
    }

    /// Sets the credentials attached to every request.
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Authenticates with a Moov API key pair (HTTP Basic).
    pub fn with_credentials(
        self,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let secret_key: String = secret_key.into();
        self.with_authentication(Authentication::Basic {
            username: public_key.into(),
            password: secret_key.into(),
        })
    }

    /// Authenticates with an access token.
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.with_authentication(Authentication::Bearer(token.into()))
    }

    /// Sets the default deadline of every call.
    ///
    /// Ignored when a client is injected with [`with_client`](Self::with_client).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` header.
    ///
    /// Ignored when a client is injected with [`with_client`](Self::with_client).
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Uses a pre-configured `reqwest::Client` for the transport.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }
}

impl Default for MoovClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            scheme: Scheme::HTTPS,
            host: DEFAULT_HOST.to_string(),
            port: None,
            base_path: None,
            authentication: None,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
