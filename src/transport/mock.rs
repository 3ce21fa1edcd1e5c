//! Mock transport for testing.
//!
//! Returns a canned envelope or failure and records every request it sees.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::{parse_envelope, OutboundRequest, Transport, TransportFailure};
use crate::response::QueryResultEnvelope;

/// A transport that answers every request with the same reply.
#[derive(Debug)]
pub struct MockTransport {
    reply: std::result::Result<QueryResultEnvelope, TransportFailure>,
    delay: Option<Duration>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    /// Creates a mock that returns the given envelope.
    pub fn with_envelope(envelope: QueryResultEnvelope) -> Self {
        Self::with_reply(Ok(envelope))
    }

    /// Creates a mock that fails every request.
    pub fn failing(failure: TransportFailure) -> Self {
        Self::with_reply(Err(failure))
    }

    /// Creates a mock that answers with the given JSON body.
    ///
    /// An unparseable body makes every request fail with `parsererror`.
    pub fn with_body(body: &str) -> Self {
        Self::with_reply(parse_envelope(body))
    }

    fn with_reply(reply: std::result::Result<QueryResultEnvelope, TransportFailure>) -> Self {
        Self {
            reply,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Delays every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(
        &self,
        request: &OutboundRequest,
    ) -> std::result::Result<QueryResultEnvelope, TransportFailure> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.reply.clone()
    }
}
