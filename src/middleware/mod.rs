//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! entry point registers constructors
//!     → registry.rs (phase-partitioned name → constructor catalog)
//!     → manager.rs (one shared instance per name, resolve name lists)
//!     → dispatch folds resolved chains around the proxy handler
//! ```
//!
//! # Design Decisions
//! - A chain is an explicit fold over an ordered wrapper list, not ad-hoc
//!   nested closures; ordering is unit-testable without the engine
//! - Instances are shared across all concurrent requests, so a middleware
//!   must be stateless or internally synchronized

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};

pub mod builtin;
pub mod manager;
pub mod registry;

pub use manager::{ExecutionOrderError, Manager};
pub use registry::Registry;

/// Error type carried through a middleware chain. An `Err` from any link
/// short-circuits the links behind it and surfaces through the engine as a
/// structured 500.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by a [`Handler`] invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, BoxError>> + Send>>;

/// A request handler: the terminal proxy executor, or any wrapper a
/// middleware has folded around it.
pub type Handler = Arc<dyn Fn(Request<Body>) -> HandlerFuture + Send + Sync>;

/// Middleware execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs ahead of the backend call.
    OnRequest,
    /// Runs after the backend call, on the way out.
    OnResponse,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::OnRequest => f.write_str("onRequest"),
            Phase::OnResponse => f.write_str("onResponse"),
        }
    }
}

/// A named request wrapper.
///
/// One instance serves every matching route concurrently; implementations
/// must be `Send + Sync` and keep no per-request state outside the wrapped
/// closure.
pub trait Middleware: Send + Sync {
    /// Name the registry and selectors refer to this middleware by.
    fn name(&self) -> &str;

    /// Fold this middleware around `next`, returning the wrapped handler.
    fn wrap(self: Arc<Self>, next: Handler) -> Handler;
}

/// Fold `handler` through `chain` in reverse list order, so the first entry
/// becomes the outermost wrapper: execution order equals declaration order,
/// return order is the mirror image.
pub fn compose(handler: Handler, chain: &[Arc<dyn Middleware>]) -> Handler {
    chain
        .iter()
        .rev()
        .fold(handler, |next, mw| mw.clone().wrap(next))
}
