use std::sync::LazyLock;

use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use super::{MalformedPathReason, MoovError};

/// Regular expression for matching path placeholders in the format `{name}`.
#[allow(clippy::expect_used)]
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// Everything but RFC 3986 unreserved characters is encoded inside a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// One server operation: an HTTP method, a path template and its arguments.
///
/// Placeholders use the `{name}` syntax and are substituted **positionally**:
/// the first argument replaces the first placeholder, and so on. The names only
/// document the template. Each argument is percent-encoded as a path segment.
///
/// ```rust
/// use http::Method;
/// use moov_client::Endpoint;
///
/// let endpoint = Endpoint::new(
///     Method::GET,
///     "/accounts/{accountID}/wallets/{walletID}/sweeps",
///     ["acc-1", "wal-2"],
/// );
/// assert_eq!(
///     endpoint.resolve_path()?,
///     "/accounts/acc-1/wallets/wal-2/sweeps"
/// );
/// # Ok::<(), moov_client::MoovError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{method} {template}")]
pub struct Endpoint {
    method: Method,
    template: String,
    args: Vec<String>,
}

impl Endpoint {
    /// Creates an endpoint from a method, a path template and its positional arguments.
    pub fn new<I, S>(method: Method, template: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            template: template.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The unresolved path template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The positional path arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Number of placeholders in the template.
    pub fn placeholder_count(&self) -> usize {
        RE.find_iter(&self.template).count()
    }

    /// Substitutes every placeholder with its argument.
    ///
    /// Argument content is not validated; that is the server's job.
    ///
    /// # Errors
    ///
    /// Returns [`MoovError::MalformedPath`] when the number of arguments differs
    /// from the number of placeholders, or when an argument is `.` or `..`.
    pub fn resolve_path(&self) -> Result<String, MoovError> {
        let expected = self.placeholder_count();
        if expected != self.args.len() {
            return Err(self.malformed(MalformedPathReason::ArgumentCount {
                expected,
                actual: self.args.len(),
            }));
        }
        // URL parsing drops dot segments, even percent-encoded ones
        if let Some((position, argument)) = self
            .args
            .iter()
            .enumerate()
            .find(|(_, arg)| matches!(arg.as_str(), "." | ".."))
        {
            return Err(self.malformed(MalformedPathReason::DotSegment {
                position,
                argument: argument.clone(),
            }));
        }

        let template = self.template.as_str();
        let mut path = String::with_capacity(template.len());
        let mut last = 0;
        for (found, arg) in RE.find_iter(template).zip(&self.args) {
            path.push_str(template.get(last..found.start()).unwrap_or_default());
            path.push_str(&encode_path_segment(arg));
            last = found.end();
        }
        path.push_str(template.get(last..).unwrap_or_default());

        Ok(path)
    }

    fn malformed(&self, reason: MalformedPathReason) -> MoovError {
        MoovError::MalformedPath {
            template: self.template.clone(),
            reason,
        }
    }
}
