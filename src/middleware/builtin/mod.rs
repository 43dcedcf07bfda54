//! Builtin middlewares shipped with the gateway.
//!
//! Each one satisfies the [`Middleware`](crate::middleware::Middleware)
//! contract and is registered explicitly by the entry point via
//! [`register_defaults`]; selectors refer to them by name.

use std::sync::Arc;

use crate::middleware::{Phase, Registry};

pub mod cors;
pub mod logger;
pub mod timer;

pub use cors::Cors;
pub use logger::RequestLogger;
pub use timer::Timer;

/// Register every builtin middleware under its selector name.
pub fn register_defaults(registry: &mut Registry) {
    registry.register(Phase::OnRequest, "logger", || Arc::new(RequestLogger));
    registry.register(Phase::OnRequest, "cors", || Arc::new(Cors));
    registry.register(Phase::OnResponse, "timer", || Arc::new(Timer));
}
