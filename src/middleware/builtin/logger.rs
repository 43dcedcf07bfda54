//! Request logging middleware (pre-request phase).

use std::sync::Arc;

use crate::middleware::{Handler, Middleware};

/// Logs every inbound request before delegating down the chain.
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn name(&self) -> &str {
        "logger"
    }

    fn wrap(self: Arc<Self>, next: Handler) -> Handler {
        Arc::new(move |req| {
            let next = next.clone();
            Box::pin(async move {
                tracing::info!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "Inbound request"
                );
                next(req).await
            })
        })
    }
}
