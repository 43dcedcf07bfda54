//! CORS middleware (pre-request phase).
//!
//! Answers `OPTIONS` preflights directly with 204, without reaching the
//! backend; every other response gets the CORS headers stamped on the way
//! out.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::HeaderMap, HeaderValue, Method, StatusCode},
    response::Response,
};

use crate::middleware::{Handler, Middleware};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

pub struct Cors;

fn apply_headers(headers: &mut HeaderMap) {
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

impl Middleware for Cors {
    fn name(&self) -> &str {
        "cors"
    }

    fn wrap(self: Arc<Self>, next: Handler) -> Handler {
        Arc::new(move |req| {
            let next = next.clone();
            Box::pin(async move {
                if req.method() == Method::OPTIONS {
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = StatusCode::NO_CONTENT;
                    apply_headers(response.headers_mut());
                    return Ok(response);
                }

                let mut response = next(req).await?;
                apply_headers(response.headers_mut());
                Ok(response)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::{terminal, request};
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let wrapped = Arc::new(Cors).wrap(terminal(log.clone()));

        let preflight = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("http://gateway.test/anything")
            .body(Body::empty())
            .unwrap();
        let response = wrapped(preflight).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            HeaderValue::from_static("*")
        );
        // The backend handler never ran.
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_response_headers_are_stamped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let wrapped = Arc::new(Cors).wrap(terminal(log.clone()));

        let response = wrapped(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-methods"],
            HeaderValue::from_static(ALLOW_METHODS)
        );
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
    }
}
