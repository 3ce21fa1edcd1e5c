//! Transport layer for saiku-embed.
//!
//! Provides a trait-based interface for sending a built query request and
//! receiving the result envelope, so the HTTP client can be swapped for a
//! mock in tests.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::response::QueryResultEnvelope;

/// Content type sent with every query request.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Status text for requests that ran out of time.
pub const STATUS_TIMEOUT: &str = "timeout";

/// Status text for responses whose body is not a valid envelope.
pub const STATUS_PARSE_ERROR: &str = "parsererror";

/// Status text for connection failures and non-2xx responses.
pub const STATUS_ERROR: &str = "error";

/// A fully built query request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Export endpoint URL without query string.
    pub url: String,

    /// Query string fields, in send order.
    pub fields: Vec<(String, String)>,

    /// `Authorization` header value, if credentials are configured.
    pub authorization: Option<String>,

    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl OutboundRequest {
    /// Returns the value of the named field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the fields encoded as `application/x-www-form-urlencoded`.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.fields)
            .finish()
    }

    /// Returns the URL with the encoded query string appended.
    pub fn full_url(&self) -> String {
        if self.fields.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query_string())
        }
    }
}

/// A failed request, described the way a browser transport reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Short status text: `timeout`, `parsererror` or `error`.
    pub status_text: String,

    /// Raw failure detail (HTTP status line, offending body, client error).
    pub raw: String,

    /// Error raised while handling the response, if any.
    pub thrown: Option<String>,
}

impl TransportFailure {
    /// Creates a failure with an arbitrary status text.
    pub fn new(status_text: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            status_text: status_text.into(),
            raw: raw.into(),
            thrown: None,
        }
    }

    /// Attaches the thrown error.
    pub fn with_thrown(mut self, thrown: impl Into<String>) -> Self {
        self.thrown = Some(thrown.into());
        self
    }

    /// A request that timed out.
    pub fn timeout(raw: impl Into<String>) -> Self {
        Self::new(STATUS_TIMEOUT, raw)
    }

    /// A response body that could not be parsed.
    pub fn parse_error(raw: impl Into<String>, thrown: impl Into<String>) -> Self {
        Self::new(STATUS_PARSE_ERROR, raw).with_thrown(thrown)
    }

    /// A connection failure or other client error.
    pub fn error(raw: impl Into<String>) -> Self {
        Self::new(STATUS_ERROR, raw)
    }

    /// A non-2xx HTTP response. The reason phrase is the thrown error.
    pub fn http_status(status: u16, reason: Option<&str>, body: &str) -> Self {
        let failure = Self::error(format!("HTTP {status}: {}", excerpt(body)));
        match reason {
            Some(reason) => failure.with_thrown(reason),
            None => failure,
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_text, self.raw)?;
        if let Some(thrown) = &self.thrown {
            write!(f, " ({thrown})")?;
        }
        Ok(())
    }
}

/// Trait for transports that execute query requests.
///
/// Implementations must be thread-safe (Send + Sync) because each
/// execution runs on its own task.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and parses the JSON envelope.
    async fn fetch(
        &self,
        request: &OutboundRequest,
    ) -> std::result::Result<QueryResultEnvelope, TransportFailure>;
}

/// Parses a response body into an envelope.
pub fn parse_envelope(body: &str) -> std::result::Result<QueryResultEnvelope, TransportFailure> {
    serde_json::from_str(body).map_err(|e| TransportFailure::parse_error(excerpt(body), e.to_string()))
}

/// Maximum number of characters of a body kept in a failure.
const EXCERPT_CHARS: usize = 200;

fn excerpt(body: &str) -> String {
    if body.chars().count() <= EXCERPT_CHARS {
        body.to_string()
    } else {
        let mut out: String = body.chars().take(EXCERPT_CHARS).collect();
        out.push('…');
        out
    }
}
