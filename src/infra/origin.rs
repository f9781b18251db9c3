//! Origin HTTP client
//!
//! Forwards requests to the upstream origin. The client keeps reqwest's
//! defaults: no timeout, no retry, default redirect policy.

use reqwest::{Body, Method, Response, StatusCode};
use tracing::debug;

use crate::error::FetchError;

/// Client for the upstream origin
#[derive(Debug, Clone, Default)]
pub struct OriginClient {
    client: reqwest::Client,
}

impl OriginClient {
    /// Create a client with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `method url` with `body` and return the response if it is a 200
    ///
    /// No headers are copied from the inbound request. Any status other than
    /// exactly 200 is reported as [`FetchError::NonSuccess`] without reading
    /// the body.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        body: Option<Body>,
    ) -> Result<Response, FetchError> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let request = builder.build().map_err(|e| FetchError::InvalidRequest {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        debug!(method = %request.method(), %url, "forwarding to origin");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::NonSuccess {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}
