//! Proxy executor: the terminal handler behind every middleware chain.
//!
//! # Responsibilities
//! - Build the outbound request from the inbound one and the route config
//! - Execute the backend call and relay the response
//! - Recover every per-request failure into a structured JSON error
//!
//! # Design Decisions
//! - The outbound path is the target's own path; inbound path segments
//!   past the route match are not forwarded
//! - No outbound timeout; an unresponsive backend blocks the request task
//! - The backend body is read fully before the relay response is built, so
//!   a read failure still yields a clean 500

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::schema::Route;
use crate::middleware::Handler;

/// Outbound HTTP client shared by every route handler. Connection reuse is
/// whatever the legacy client pool provides by default.
pub type HttpClient = Client<HttpConnector, Body>;

pub fn new_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Build the terminal handler for one route.
///
/// The handler never returns a chain error: all four failure outcomes
/// (invalid target, construction failure, transport failure, body-read
/// failure) are recovered locally into JSON responses.
pub fn handler(route: Route, client: HttpClient) -> Handler {
    Arc::new(move |req| {
        let route = route.clone();
        let client = client.clone();
        Box::pin(async move { Ok(forward(route, client, req).await) })
    })
}

async fn forward(route: Route, client: HttpClient, req: Request<Body>) -> Response {
    let Some(upstream) = upstream_uri(&route.target, req.uri().query()) else {
        tracing::warn!(target = %route.target, "Route target is not a valid URL");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "invalid target URL");
    };

    let (parts, body) = req.into_parts();

    let mut outbound = match Request::builder()
        .method(parts.method.clone())
        .uri(&upstream)
        .body(body)
    {
        Ok(outbound) => outbound,
        Err(err) => {
            tracing::warn!(upstream = %upstream, error = %err, "Failed to build upstream request");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to build upstream request",
            );
        }
    };

    // Every inbound header value is carried over, multi-value headers
    // included. The host header is then rewritten to the backend authority;
    // a route-configured Host still wins below.
    for (name, value) in parts.headers.iter() {
        outbound.headers_mut().append(name.clone(), value.clone());
    }
    if let Some(authority) = authority_of(&route.target) {
        if let Ok(value) = HeaderValue::from_str(&authority) {
            outbound.headers_mut().insert(header::HOST, value);
        }
    }

    // Route overrides replace same-named inbound values, never append.
    for (key, value) in &route.headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                outbound.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %key, "Skipping invalid configured header"),
        }
    }

    let upstream_response = match client.request(outbound).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(upstream = %upstream, error = %err, "Upstream request failed");
            return error_response(StatusCode::BAD_GATEWAY, "failed to proxy request");
        }
    };

    let (parts, body) = upstream_response.into_parts();
    let bytes = match axum::body::to_bytes(Body::new(body), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(upstream = %upstream, error = %err, "Failed to read upstream response");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read upstream response",
            );
        }
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = parts.status;
    for (name, value) in parts.headers.iter() {
        response.headers_mut().append(name.clone(), value.clone());
    }
    response
}

/// The absolute outbound URI for a route target: scheme, authority, and the
/// target's own path, with the inbound query string appended unchanged.
/// `None` when the target does not parse or names no host.
fn upstream_uri(target: &str, query: Option<&str>) -> Option<String> {
    let target = Url::parse(target).ok()?;
    target.host_str()?;

    let mut upstream = format!(
        "{}://{}{}",
        target.scheme(),
        authority_from(&target),
        target.path()
    );
    if let Some(query) = query {
        upstream.push('?');
        upstream.push_str(query);
    }
    Some(upstream)
}

/// `host[:port]` of a target URL, if it has a host.
fn authority_of(target: &str) -> Option<String> {
    let target = Url::parse(target).ok()?;
    target.host_str()?;
    Some(authority_from(&target))
}

fn authority_from(target: &Url) -> String {
    match (target.host_str(), target.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
