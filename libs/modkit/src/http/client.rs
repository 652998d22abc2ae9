//! Traced HTTP client.
//!
//! Wraps `reqwest::Client` so every outgoing request runs inside an
//! `outgoing_http` span and carries a W3C `traceparent` header.

use crate::http::trace_context;
use tracing::{field::Empty, Instrument, Level};

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Execute a built request, injecting trace headers and recording the
    /// response status on the span.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            otel.kind = "client",
            http.status_code = Empty,
            error = Empty,
        );

        trace_context::inject_trace_context(req.headers_mut(), &span);

        let inner = self.inner.clone();
        async move {
            let response = inner.execute(req).await?;

            let span = tracing::Span::current();
            span.record("http.status_code", response.status().as_u16());
            if response.status().is_client_error() || response.status().is_server_error() {
                span.record("error", true);
            }
            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Build and execute a request prepared with [`TracedClient::request`].
    pub async fn send(&self, builder: reqwest::RequestBuilder) -> reqwest::Result<reqwest::Response> {
        let req = builder.build()?;
        self.execute(req).await
    }

    /// Start a request builder on the underlying client (headers, body, timeout).
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
