//! Concrete request-delivery mechanisms.
//!
//! # Responsibilities
//! - Bind the live TCP listener (fatal on failure, no partial state)
//! - Provide the unstarted in-process harness for test mode
//! - Keep force-close idempotent for both variants

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;

use crate::config::{ExecutionMode, ServerConfig};
use crate::error::ServerError;

/// The mechanism delivering HTTP requests to the router. Exactly one
/// variant exists per server instance.
pub enum Transport {
    /// A bound OS socket serving real network traffic.
    Network(TcpListener),
    /// An in-memory endpoint with no socket.
    InProcess(Harness),
}

impl Transport {
    /// Construct the transport selected by the execution mode.
    ///
    /// Live mode binds `0.0.0.0:port` immediately so that port conflicts
    /// surface at init rather than mid-startup.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        match config.mode {
            ExecutionMode::Live => {
                let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
                let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
                let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
                tracing::info!(address = %local_addr, "listener bound");
                Ok(Transport::Network(listener))
            }
            ExecutionMode::Test => Ok(Transport::InProcess(Harness::unstarted())),
        }
    }

    /// Close whatever is left of the transport. Safe to call repeatedly.
    pub fn force_close(&mut self) {
        match self {
            // The listener itself is consumed into the serve loop at start;
            // dropping that loop closes the socket. Nothing to do here.
            Transport::Network(_) => {}
            Transport::InProcess(harness) => harness.close(),
        }
    }
}

/// In-process HTTP endpoint for test mode.
///
/// Mirrors an unstarted test server: constructed without a router, armed
/// with the frozen router at start, closed by dropping it.
#[derive(Default)]
pub struct Harness {
    app: Option<Router>,
}

impl Harness {
    /// A harness with no router installed yet.
    pub fn unstarted() -> Self {
        Self::default()
    }

    /// Install the frozen router; the harness can now serve clients.
    pub fn start(&mut self, app: Router) {
        self.app = Some(app);
    }

    pub fn is_started(&self) -> bool {
        self.app.is_some()
    }

    /// A client dispatching into the installed router, or `None` before
    /// start / after close.
    pub fn client(&self) -> Option<HarnessClient> {
        self.app.clone().map(|app| HarnessClient { app })
    }

    /// Drop the installed router. Idempotent.
    pub fn close(&mut self) {
        self.app = None;
    }
}

/// Cheaply cloneable client that feeds requests straight into the router.
#[derive(Clone)]
pub struct HarnessClient {
    app: Router,
}

impl HarnessClient {
    /// Dispatch a full request through the router, in-process.
    pub async fn request(&self, request: Request<Body>) -> Response {
        match self.app.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Convenience GET against the harness.
    pub async fn get(&self, uri: &str) -> Result<Response, axum::http::Error> {
        let request = Request::builder().uri(uri).body(Body::empty())?;
        Ok(self.request(request).await)
    }
}
