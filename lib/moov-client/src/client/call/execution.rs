use headers::HeaderMapExt;
use reqwest::{Body, Request};
use tracing::debug;
use url::Url;

use super::CallBuilder;
use crate::client::response::RawResponse;
use crate::client::{Authentication, MoovError};

impl CallBuilder {
    pub(in crate::client) fn build_request(
        &self,
        base_url: &Url,
        authentication: Option<&Authentication>,
    ) -> Result<Request, MoovError> {
        let url = self.build_url(base_url)?;
        let mut request = Request::new(self.method().clone(), url);
        let req_headers = request.headers_mut();

        if let Some(auth) = authentication {
            let (header_name, header_value) = auth.to_header()?;
            req_headers.insert(header_name, header_value);
        }

        // Option headers come last so they can override the defaults
        for (name, value) in &self.headers {
            req_headers.insert(name.clone(), value.clone());
        }

        if let Some(body) = &self.body {
            req_headers.typed_insert(body.content_type.clone());
            *request.body_mut() = Some(Body::from(body.data.clone()));
        }

        if let Some(timeout) = self.timeout {
            *request.timeout_mut() = Some(timeout);
        }

        Ok(request)
    }

    /// Sends the call and reads the whole response.
    ///
    /// Any status is returned as-is; interpreting it is the resolvers' job.
    pub(in crate::client) async fn exchange(
        self,
        client: &reqwest::Client,
        base_url: &Url,
        authentication: Option<&Authentication>,
    ) -> Result<RawResponse, MoovError> {
        let operation = self.endpoint.to_string();
        let request = self.build_request(base_url, authentication)?;

        debug!(?request, "sending...");
        let response = client
            .execute(request)
            .await
            .map_err(|source| MoovError::Transport {
                operation: operation.clone(),
                source,
            })?;
        debug!(?response, "...receiving");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| MoovError::Transport { operation, source })?;

        Ok(RawResponse::new(status, headers, body))
    }
}
