//! Request timing middleware (post-response phase).

use std::sync::Arc;
use std::time::Instant;

use crate::middleware::{Handler, Middleware};

/// Measures wall time around the rest of the chain, backend call included.
pub struct Timer;

impl Middleware for Timer {
    fn name(&self) -> &str {
        "timer"
    }

    fn wrap(self: Arc<Self>, next: Handler) -> Handler {
        Arc::new(move |req| {
            let next = next.clone();
            Box::pin(async move {
                let method = req.method().clone();
                let path = req.uri().path().to_string();
                let start = Instant::now();

                let result = next(req).await;

                tracing::info!(
                    method = %method,
                    path = %path,
                    elapsed = ?start.elapsed(),
                    "Request completed"
                );
                result
            })
        })
    }
}
