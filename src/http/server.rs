//! The server component: owns the router, the transport and the lifecycle.
//!
//! # Responsibilities
//! - Construct router and transport according to the execution mode
//! - Gate operations on the `Ready → Live → ShuttingDown → ShutDown` states
//! - Expose the router registration surface (valid during `Ready` only)
//! - Block the start caller until the shutdown coordinator releases it
//!
//! # Design Decisions
//! - Collaborators (event bus, config) are constructor arguments; there is
//!   no process-wide registry
//! - Misuse (`shutdown` before `start`, double `start`) is a typed error,
//!   not undefined behavior
//! - No std mutex guard is ever held across an await point, so `start` and
//!   `shutdown` stay `Send`

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Request;
use axum::handler::Handler;
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, Route};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::{Layer, Service};

use crate::config::{ExecutionMode, ServerConfig};
use crate::error::ServerError;
use crate::events::{EventBus, ServerEvent};
use crate::lifecycle::shutdown::ShutdownSequence;
use crate::lifecycle::state::{ServerState, StateCell};
use crate::net::{HarnessClient, Transport};
use crate::observability;
use crate::routing::{RouteEntry, RouterFacade};

/// An embeddable HTTP server with a managed lifecycle.
///
/// Intended to be shared behind an [`Arc`]: one task blocks in
/// [`HttpServer::start`] while others (signal handlers, supervisors) may
/// call [`HttpServer::shutdown`].
pub struct HttpServer {
    config: ServerConfig,
    events: Arc<EventBus>,
    state: Arc<StateCell>,
    /// Set at init for the live transport; `None` in test mode.
    local_addr: Option<SocketAddr>,
    /// Present during `Ready`, taken (frozen) at start.
    router: Mutex<Option<RouterFacade>>,
    /// The network variant is consumed into the serve loop at start; the
    /// in-process harness stays here for client access.
    transport: Arc<Mutex<Option<Transport>>>,
    started: AtomicBool,
    shutdown_requested: AtomicBool,
    drain_tx: Mutex<Option<oneshot::Sender<()>>>,
    serve_task: Mutex<Option<JoinHandle<Result<(), std::io::Error>>>>,
    done_tx: Mutex<Option<oneshot::Sender<Result<(), ServerError>>>>,
}

macro_rules! verb_delegates {
    ($( ($name:ident, $method:literal) ),+ $(,)?) => {
        $(
            #[doc = concat!("Register a ", $method, " handler at `pattern`. Valid during `Ready` only.")]
            pub fn $name<H, T>(&self, pattern: &str, handler: H) -> Result<(), ServerError>
            where
                H: Handler<T, ()>,
                T: 'static,
            {
                self.with_router(|router| router.$name(pattern, handler))
            }
        )+
    };
}

impl HttpServer {
    /// Construct the server: build the router façade and the transport
    /// selected by the execution mode, then enter `Ready`.
    ///
    /// Live mode binds the listener here, so a port conflict fails init and
    /// no partial instance is retained. Live mode also attaches the default
    /// catch-all middleware that debug-logs every inbound request URI.
    pub async fn init(config: ServerConfig, events: Arc<EventBus>) -> Result<Self, ServerError> {
        let mut facade = RouterFacade::new();
        if config.mode == ExecutionMode::Live {
            facade.layer(
                "request-logging",
                axum::middleware::from_fn(observability::log_request),
            );
        }

        let transport = Transport::bind(&config).await?;
        let local_addr = match &transport {
            Transport::Network(listener) => {
                Some(listener.local_addr().map_err(ServerError::Bind)?)
            }
            Transport::InProcess(_) => None,
        };

        tracing::info!(mode = %config.mode, port = config.port, "server initialized");

        Ok(Self {
            config,
            events,
            state: Arc::new(StateCell::new()),
            local_addr,
            router: Mutex::new(Some(facade)),
            transport: Arc::new(Mutex::new(Some(transport))),
            started: AtomicBool::new(false),
            shutdown_requested: AtomicBool::new(false),
            drain_tx: Mutex::new(None),
            serve_task: Mutex::new(None),
            done_tx: Mutex::new(None),
        })
    }

    /// Go live and block until shutdown completes.
    ///
    /// Callable exactly once per instance; a second call (or a call after
    /// shutdown) returns [`ServerError::AlreadyStarted`]. Transitions
    /// `Ready → Live`, publishes [`ServerEvent::Initialized`], then suspends
    /// on the one-shot shutdown signal. The value returned is the final
    /// shutdown outcome: `Ok` after a clean drain,
    /// [`ServerError::DrainTimedOut`] if the listener was force-closed.
    pub async fn start(&self) -> Result<(), ServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyStarted);
        }

        let facade = self
            .router
            .lock()
            .expect("router slot poisoned")
            .take()
            .ok_or(ServerError::AlreadyStarted)?;
        let app = facade.into_router();

        let (done_tx, done_rx) = oneshot::channel();
        *self.done_tx.lock().expect("signal slot poisoned") = Some(done_tx);

        let transport = self
            .transport
            .lock()
            .expect("transport slot poisoned")
            .take()
            .ok_or(ServerError::AlreadyStarted)?;

        match transport {
            Transport::Network(listener) => {
                let addr = listener.local_addr().map_err(ServerError::Bind)?;
                let (drain_tx, drain_rx) = oneshot::channel::<()>();
                *self.drain_tx.lock().expect("drain slot poisoned") = Some(drain_tx);

                let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = drain_rx.await;
                });
                let handle = tokio::spawn(async move { serve.await });
                *self.serve_task.lock().expect("serve slot poisoned") = Some(handle);

                self.state.advance(ServerState::Live)?;
                self.events.publish(ServerEvent::Initialized);
                tracing::info!(address = %addr, "http server listening");
            }
            Transport::InProcess(mut harness) => {
                harness.start(app);
                *self.transport.lock().expect("transport slot poisoned") =
                    Some(Transport::InProcess(harness));

                self.state.advance(ServerState::Live)?;
                self.events.publish(ServerEvent::Initialized);
                tracing::info!("in-process harness started");
            }
        }

        match done_rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ServerError::SignalLost),
        }
    }

    /// Request a graceful shutdown. Returns immediately; the drain runs on
    /// its own task and releases the caller blocked in [`HttpServer::start`]
    /// when it finishes.
    ///
    /// Before `start` this is a [`ServerError::NotStarted`] error. Once a
    /// shutdown is underway (or done), further calls are logged no-ops.
    /// Among concurrent callers racing the transition, exactly one drives
    /// the sequence. Must be called from within a Tokio runtime.
    pub fn shutdown(&self) -> Result<(), ServerError> {
        match self.state.current() {
            ServerState::Ready => {
                tracing::warn!("shutdown requested before start, rejecting");
                return Err(ServerError::NotStarted);
            }
            ServerState::ShuttingDown | ServerState::ShutDown => {
                tracing::debug!("shutdown already underway, ignoring");
                return Ok(());
            }
            ServerState::Live => {}
        }

        if self.shutdown_requested.swap(true, Ordering::SeqCst) {
            tracing::debug!("another caller is driving the shutdown");
            return Ok(());
        }

        tracing::info!("shutting down server");
        let sequence = ShutdownSequence {
            state: Arc::clone(&self.state),
            events: Arc::clone(&self.events),
            drain_tx: self.drain_tx.lock().expect("drain slot poisoned").take(),
            serve_task: self.serve_task.lock().expect("serve slot poisoned").take(),
            done_tx: self.done_tx.lock().expect("signal slot poisoned").take(),
            transport: Arc::clone(&self.transport),
        };
        tokio::spawn(sequence.run());
        Ok(())
    }

    verb_delegates![
        (get, "GET"),
        (post, "POST"),
        (put, "PUT"),
        (delete, "DELETE"),
        (patch, "PATCH"),
        (head, "HEAD"),
        (options, "OPTIONS"),
        (trace, "TRACE"),
    ];

    /// Register a prebuilt method router at `pattern`.
    pub fn route(&self, pattern: &str, method_router: MethodRouter) -> Result<(), ServerError> {
        self.with_router(|router| router.route(pattern, method_router))
    }

    /// Register an arbitrary tower service at `pattern`.
    pub fn route_service<S>(&self, pattern: &str, service: S) -> Result<(), ServerError>
    where
        S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        self.with_router(|router| router.route_service(pattern, service))
    }

    /// Mount a sub-router under `prefix`.
    pub fn nest(&self, prefix: &str, child: RouterFacade) -> Result<(), ServerError> {
        self.with_router(|router| router.nest(prefix, child))
    }

    /// Merge a route group at the top level.
    pub fn merge(&self, group: RouterFacade) -> Result<(), ServerError> {
        self.with_router(|router| router.merge(group))
    }

    /// Attach a named middleware layer. Layers wrap outer-to-inner in
    /// registration order.
    pub fn layer<L>(&self, name: impl Into<String>, layer: L) -> Result<(), ServerError>
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.with_router(|router| router.layer(name, layer))
    }

    /// Override the not-found handler.
    pub fn fallback<H, T>(&self, handler: H) -> Result<(), ServerError>
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.with_router(|router| router.fallback(handler))
    }

    /// Override the method-not-allowed handler.
    pub fn method_not_allowed<H, T>(&self, handler: H) -> Result<(), ServerError>
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.with_router(|router| router.method_not_allowed(handler))
    }

    /// Registered routes, in registration order. Empty after start (the
    /// journal moves into the frozen router's lifetime).
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.router
            .lock()
            .expect("router slot poisoned")
            .as_ref()
            .map(|router| router.routes().to_vec())
            .unwrap_or_default()
    }

    /// Names of attached middleware, outermost first.
    pub fn middleware(&self) -> Vec<String> {
        self.router
            .lock()
            .expect("router slot poisoned")
            .as_ref()
            .map(|router| router.middleware().to_vec())
            .unwrap_or_default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.state.current()
    }

    /// The configuration this server was constructed with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The bound address of the live listener; `None` in test mode.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// An in-process client for the test harness.
    ///
    /// Only meaningful in test mode once the server is live; rejected with
    /// [`ServerError::WrongMode`] on a live server and
    /// [`ServerError::NotStarted`] before start (or after close).
    pub fn harness_client(&self) -> Result<HarnessClient, ServerError> {
        if self.config.mode == ExecutionMode::Live {
            return Err(ServerError::WrongMode(ExecutionMode::Live));
        }
        match self
            .transport
            .lock()
            .expect("transport slot poisoned")
            .as_ref()
        {
            Some(Transport::InProcess(harness)) => {
                harness.client().ok_or(ServerError::NotStarted)
            }
            _ => Err(ServerError::NotStarted),
        }
    }

    fn with_router<R>(
        &self,
        register: impl FnOnce(&mut RouterFacade) -> R,
    ) -> Result<R, ServerError> {
        let mut guard = self.router.lock().expect("router slot poisoned");
        match guard.as_mut() {
            Some(facade) => Ok(register(facade)),
            // The façade was frozen at start; late registrations would have
            // no effect on the running router, so reject them outright.
            None => Err(ServerError::AlreadyStarted),
        }
    }
}
