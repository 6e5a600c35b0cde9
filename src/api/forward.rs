//! Forwarding of admitted requests to the origin.

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, request::Parts, HeaderMap},
    response::Response,
};
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised while talking to the origin.
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("Invalid origin URL {url}: {reason}")]
    InvalidOrigin { url: String, reason: String },

    #[error("Origin request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Destination for admitted requests.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send the original request and return the origin's response verbatim.
    async fn forward(&self, parts: Parts, body: Bytes) -> Result<Response, ForwardError>;
}

/// Headers that describe a single connection and must not be relayed.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Origin reached over HTTP with a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    origin: Url,
}

impl HttpUpstream {
    /// Create an upstream for `origin_url` with a per-request timeout.
    pub fn new(origin_url: &str, timeout: Duration) -> Result<Self, ForwardError> {
        let origin = Url::parse(origin_url).map_err(|e| ForwardError::InvalidOrigin {
            url: origin_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ForwardError::InvalidOrigin {
                url: origin_url.to_string(),
                reason: format!("unsupported scheme {}", origin.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(HttpUpstream { client, origin })
    }

    /// Origin URL for an inbound request path and query.
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.origin.as_str().trim_end_matches('/'),
            path_and_query
        )
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn forward(&self, parts: Parts, body: Bytes) -> Result<Response, ForwardError> {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = self.target_url(path_and_query);

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        // Host comes from the origin URL
        headers.remove(header::HOST);

        debug!(method = %parts.method, url = %url, "Forwarding to origin");

        let upstream = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);
        let bytes = upstream.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}
