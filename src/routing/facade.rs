//! Transparent delegate over `axum::Router` with an observable journal.
//!
//! # Responsibilities
//! - Forward verb/pattern registrations, mounting, grouping and overrides
//!   to the underlying routing engine unchanged
//! - Record every registration (ordered) for introspection and debug logs
//! - Defer middleware application so the first registered layer ends up
//!   outermost
//!
//! # Design Decisions
//! - `axum::Router` consumes `self` on every builder call, so the façade
//!   swaps the router through `mem::take` instead of rebuilding it
//! - CONNECT registration is not offered: axum's `MethodFilter` carries no
//!   CONNECT variant

use std::convert::Infallible;
use std::mem;

use axum::extract::Request;
use axum::handler::Handler;
use axum::response::IntoResponse;
use axum::routing::{self, MethodRouter, Route};
use axum::Router;
use tower::{Layer, Service};

/// One recorded registration, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// HTTP verb, or an operation label (`ROUTE`, `SERVICE`, `FALLBACK`,
    /// `405`) for non-verb registrations.
    pub method: &'static str,
    /// The pattern as given; nested entries carry the mount prefix.
    pub pattern: String,
}

type DeferredLayer = Box<dyn FnOnce(Router) -> Router + Send>;

/// Ordered, observable façade over the routing engine.
///
/// Registered handlers and middleware are appended in registration order and
/// never removed. Safe to use only before the server goes live; the server
/// freezes the façade into a plain `axum::Router` at start.
#[derive(Default)]
pub struct RouterFacade {
    router: Router,
    layers: Vec<DeferredLayer>,
    routes: Vec<RouteEntry>,
    middleware: Vec<String>,
}

macro_rules! verb_registrations {
    ($( ($name:ident, $method:literal, $router_fn:path) ),+ $(,)?) => {
        $(
            #[doc = concat!("Register a ", $method, " handler at `pattern`.")]
            pub fn $name<H, T>(&mut self, pattern: &str, handler: H)
            where
                H: Handler<T, ()>,
                T: 'static,
            {
                self.record($method, pattern);
                self.router = mem::take(&mut self.router).route(pattern, $router_fn(handler));
            }
        )+
    };
}

impl RouterFacade {
    pub fn new() -> Self {
        Self::default()
    }

    verb_registrations![
        (get, "GET", routing::get),
        (post, "POST", routing::post),
        (put, "PUT", routing::put),
        (delete, "DELETE", routing::delete),
        (patch, "PATCH", routing::patch),
        (head, "HEAD", routing::head),
        (options, "OPTIONS", routing::options),
        (trace, "TRACE", routing::trace),
    ];

    /// Register a prebuilt method router at `pattern` (generic registration
    /// for verb combinations the helpers above do not cover).
    pub fn route(&mut self, pattern: &str, method_router: MethodRouter) {
        self.record("ROUTE", pattern);
        self.router = mem::take(&mut self.router).route(pattern, method_router);
    }

    /// Register an arbitrary tower service at `pattern`.
    pub fn route_service<S>(&mut self, pattern: &str, service: S)
    where
        S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        self.record("SERVICE", pattern);
        self.router = mem::take(&mut self.router).route_service(pattern, service);
    }

    /// Mount a sub-router under `prefix`. The child's journal is folded into
    /// this one with the prefix applied; its middleware wraps only its own
    /// routes.
    pub fn nest(&mut self, prefix: &str, child: RouterFacade) {
        tracing::debug!(prefix, routes = child.routes.len(), "mounting sub-router");
        for entry in &child.routes {
            self.routes.push(RouteEntry {
                method: entry.method,
                pattern: format!("{}{}", prefix.trim_end_matches('/'), entry.pattern),
            });
        }
        self.middleware.extend(child.middleware.iter().cloned());
        self.router = mem::take(&mut self.router).nest(prefix, child.into_router());
    }

    /// Merge another façade's routes at the same level (route grouping).
    pub fn merge(&mut self, group: RouterFacade) {
        tracing::debug!(routes = group.routes.len(), "merging route group");
        self.routes.extend(group.routes.iter().cloned());
        self.middleware.extend(group.middleware.iter().cloned());
        self.router = mem::take(&mut self.router).merge(group.into_router());
    }

    /// Attach a named middleware layer.
    ///
    /// Application is deferred until [`RouterFacade::into_router`]; layers
    /// wrap outer-to-inner in registration order, so the first layer
    /// attached sees every request first.
    pub fn layer<L>(&mut self, name: impl Into<String>, layer: L)
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        let name = name.into();
        tracing::debug!(middleware = %name, "attaching middleware");
        self.middleware.push(name);
        self.layers.push(Box::new(move |router| router.layer(layer)));
    }

    /// Override the not-found handler.
    pub fn fallback<H, T>(&mut self, handler: H)
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.record("FALLBACK", "*");
        self.router = mem::take(&mut self.router).fallback(handler);
    }

    /// Override the handler invoked when a path matches but the verb does
    /// not.
    pub fn method_not_allowed<H, T>(&mut self, handler: H)
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.record("405", "*");
        self.router = mem::take(&mut self.router).method_not_allowed_fallback(handler);
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Names of attached middleware, outermost first.
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    /// Freeze the façade: apply deferred middleware (reversed, so the first
    /// registered layer is applied last and therefore wraps outermost) and
    /// hand back the finished router.
    pub fn into_router(self) -> Router {
        self.layers
            .into_iter()
            .rev()
            .fold(self.router, |router, apply| apply(router))
    }

    fn record(&mut self, method: &'static str, pattern: &str) {
        tracing::debug!(method, pattern, "attaching handler");
        self.routes.push(RouteEntry {
            method,
            pattern: pattern.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::{from_fn, Next};
    use axum::response::Response;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    async fn dispatch(router: Router, method: &str, uri: &str) -> Response {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    #[test]
    fn test_journal_preserves_registration_order() {
        let mut facade = RouterFacade::new();
        facade.get("/a", || async { "a" });
        facade.post("/a", || async { "a" });
        facade.delete("/b", || async { "b" });

        let methods: Vec<_> = facade.routes().iter().map(|e| e.method).collect();
        assert_eq!(methods, vec!["GET", "POST", "DELETE"]);
    }

    #[test]
    fn test_nested_journal_carries_prefix() {
        let mut api = RouterFacade::new();
        api.get("/users", || async { "users" });

        let mut root = RouterFacade::new();
        root.nest("/api", api);

        assert_eq!(root.routes()[0].pattern, "/api/users");
    }

    #[tokio::test]
    async fn test_same_pattern_different_verbs_both_dispatch() {
        let mut facade = RouterFacade::new();
        facade.get("/thing", || async { "got" });
        facade.post("/thing", || async { "posted" });
        let router = facade.into_router();

        let get = dispatch(router.clone(), "GET", "/thing").await;
        assert_eq!(get.status(), StatusCode::OK);
        let post = dispatch(router, "POST", "/thing").await;
        assert_eq!(post.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_first_registered_middleware_is_outermost() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let mut facade = RouterFacade::new();
        let outer = order.clone();
        facade.layer(
            "outer",
            from_fn(move |request: Request, next: Next| {
                let outer = outer.clone();
                async move {
                    outer.lock().unwrap().push("outer");
                    next.run(request).await
                }
            }),
        );
        let inner = order.clone();
        facade.layer(
            "inner",
            from_fn(move |request: Request, next: Next| {
                let inner = inner.clone();
                async move {
                    inner.lock().unwrap().push("inner");
                    next.run(request).await
                }
            }),
        );
        facade.get("/", || async { "ok" });

        assert_eq!(facade.middleware(), &["outer".to_string(), "inner".to_string()]);

        let router = facade.into_router();
        dispatch(router, "GET", "/").await;
        assert_eq!(*order.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn test_fallback_override() {
        let mut facade = RouterFacade::new();
        facade.get("/known", || async { "ok" });
        facade.fallback(|| async { (StatusCode::IM_A_TEAPOT, "custom miss") });
        let router = facade.into_router();

        let response = dispatch(router, "GET", "/unknown").await;
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_method_not_allowed_override() {
        let mut facade = RouterFacade::new();
        facade.get("/only-get", || async { "ok" });
        facade.method_not_allowed(|| async { (StatusCode::IM_A_TEAPOT, "wrong verb") });
        let router = facade.into_router();

        let response = dispatch(router, "POST", "/only-get").await;
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_merged_group_routes_dispatch() {
        let mut group = RouterFacade::new();
        group.get("/grouped", || async { "grouped" });

        let mut root = RouterFacade::new();
        root.get("/top", || async { "top" });
        root.merge(group);

        let router = root.into_router();
        assert_eq!(dispatch(router.clone(), "GET", "/top").await.status(), StatusCode::OK);
        assert_eq!(dispatch(router, "GET", "/grouped").await.status(), StatusCode::OK);
    }
}
