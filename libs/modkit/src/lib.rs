//! # ModKit - shared HTTP plumbing
//!
//! Building blocks reused by every REST module and by the server binary:
//!
//! - **Problem responses**: a single JSON error shape carrying a `message`
//! - **Traced HTTP client**: outgoing requests wrapped in a span with a
//!   `traceparent` header
//! - **Ingress**: request-id propagation, request tracing, timeouts, CORS,
//!   body limits, health check
//! - **Shutdown**: waits for the platform's termination signals

pub use anyhow::Result;

pub mod api;
pub mod http;
pub mod ingress;
pub mod shutdown;

pub use api::problem::{Problem, ProblemResponse};
pub use self::http::client::TracedClient;
pub use ingress::{IngressConfig, XRequestId};
