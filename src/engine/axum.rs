//! Axum adapter, the one concrete [`Engine`] implementation.
//!
//! # Responsibilities
//! - Stage route registrations and the root-scope chain
//! - Materialize the axum router when serving starts
//! - Inject a request ID and HTTP trace spans
//!
//! # Design Decisions
//! - Registrations are staged and the router is built only on serve, so a
//!   failed dispatch load leaves no route live (all-or-nothing)
//! - Chain errors surface here as a structured 500; per-request proxy
//!   failures never reach this path, the executor recovers them itself

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::engine::{Engine, Method};
use crate::middleware::{compose, Handler, Middleware};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Routing engine backed by axum.
#[derive(Default)]
pub struct AxumEngine {
    root_chain: Vec<Arc<dyn Middleware>>,
    routes: Vec<(Method, String, Handler)>,
}

impl Engine for AxumEngine {
    fn attach(&mut self, chain: Vec<Arc<dyn Middleware>>) {
        self.root_chain.extend(chain);
    }

    fn register(&mut self, method: Method, path: &str, handler: Handler) {
        tracing::debug!(method = %method, path = %path, "Route staged");
        self.routes.push((method, path.to_string(), handler));
    }
}

impl AxumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Build the axum router from the staged registrations. Handlers for
    /// the same path merge into one method router; the root-scope chain
    /// wraps every handler outermost.
    pub fn into_router(self) -> Router {
        let AxumEngine { root_chain, routes } = self;

        let mut method_routers: BTreeMap<String, MethodRouter> = BTreeMap::new();
        for (method, path, handler) in routes {
            let handler = compose(handler, &root_chain);
            let call = move |req: Request| {
                let handler = handler.clone();
                async move {
                    match handler(req).await {
                        Ok(response) => response,
                        Err(err) => chain_error_response(err),
                    }
                }
            };
            let entry = method_routers.entry(path).or_default();
            *entry = std::mem::take(entry).on(filter(method), call);
        }

        let mut router = Router::new();
        for (path, method_router) in method_routers {
            router = router.route(&path, method_router);
        }

        router
            .layer(from_fn(ensure_request_id))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the address and serve until ctrl-c.
    pub async fn serve(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(
            address = %local_addr,
            routes = self.route_count(),
            "Gateway listening"
        );

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

fn filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Put => MethodFilter::PUT,
        Method::Delete => MethodFilter::DELETE,
        Method::Patch => MethodFilter::PATCH,
    }
}

/// Render an error escaping the middleware chain as a structured 500.
fn chain_error_response(err: crate::middleware::BoxError) -> Response {
    tracing::error!(error = %err, "Middleware chain error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

/// Stamp a correlation ID onto requests that arrive without one.
async fn ensure_request_id(mut req: Request, next: Next) -> Response {
    if !req.headers().contains_key(X_REQUEST_ID) {
        let id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&id) {
            req.headers_mut().insert(X_REQUEST_ID, value);
        }
    }
    next.run(req).await
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
