//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for hosting binaries
//! - Provide the catch-all request-logging middleware attached in live mode
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Log level configurable via RUST_LOG, with a caller-supplied default

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Call once
/// per process, from the hosting binary.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Catch-all middleware logging every inbound request URI, then falling
/// through to normal routing. Attached as the outermost layer in live mode.
pub async fn log_request(request: Request, next: Next) -> Response {
    tracing::debug!(method = %request.method(), uri = %request.uri(), "inbound request");
    next.run(request).await
}
