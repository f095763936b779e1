//! HTTP seam between the API clients and the network.
//!
//! Clients build an [`ApiRequest`] and decode the JSON they get back; a
//! [`Transport`] only moves bytes. `HttpTransport` uses reqwest; tests plug in
//! [`MockTransport`](super::mock_transport::MockTransport).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::types::errors::TransportError;

/// A GET request relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Path segments, unencoded (`["api", "chapters", "<id>"]`).
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new<S: AsRef<str>>(segments: &[S]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.as_ref().to_string()).collect(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// `/api/series` style path, without the query.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>>;

/// Trait defining how API requests reach the backend.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a>;
}

/// Transport over HTTP(S) with a shared reqwest client.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url =
            Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Resolves `request` against the base URL, percent-encoding each segment.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(&request.segments);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            let url = self.url_for(request)?;
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            Ok(ApiResponse { status, body })
        })
    }
}

/// Issues `request` and decodes a 2xx JSON body as `T`.
///
/// Non-2xx statuses become `TransportError::Status` regardless of the body.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: &ApiRequest,
) -> Result<T, TransportError> {
    let response = transport.get(request).await?;
    if !response.is_success() {
        return Err(TransportError::Status(response.status));
    }
    serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
}
