//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::Client;
use tracing::debug;

use super::{parse_envelope, OutboundRequest, Transport, TransportFailure, FORM_CONTENT_TYPE};
use crate::error::{SaikuError, Result};
use crate::response::QueryResultEnvelope;

/// Sends query requests over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new HTTP transport.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| SaikuError::connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Creates a transport around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Maps a send error to a transport failure.
    fn classify_error(e: reqwest::Error) -> TransportFailure {
        if e.is_timeout() {
            TransportFailure::timeout(e.to_string())
        } else if e.is_decode() {
            TransportFailure::parse_error(e.to_string(), e.to_string())
        } else {
            TransportFailure::error(e.to_string()).with_thrown(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        request: &OutboundRequest,
    ) -> std::result::Result<QueryResultEnvelope, TransportFailure> {
        let mut builder = self
            .client
            .get(&request.url)
            .query(&request.fields)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");

        if let Some(auth) = &request.authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(Self::classify_error)?;

        let status = response.status();
        debug!(status = %status, url = %request.url, "Received query response");

        let body = response.text().await.map_err(Self::classify_error)?;

        if !status.is_success() {
            return Err(TransportFailure::http_status(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }

        parse_envelope(&body)
    }
}
