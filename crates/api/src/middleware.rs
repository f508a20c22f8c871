//! Credential extraction and request logging. Requests are not rejected
//! here: the raw key is handed to the account service, which decides.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// The caller's API key from `Authorization: Bearer <key>`, falling back to
/// `X-API-Key: <key>`. Blank or non-ASCII values count as absent.
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    bearer(headers).or_else(|| api_key_header(headers))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn api_key_header(headers: &HeaderMap) -> Option<&str> {
    let key = headers.get(API_KEY_HEADER)?.to_str().ok()?.trim();
    (!key.is_empty()).then_some(key)
}

/// One `info` event per request with method, path, status and latency.
/// Headers are never logged, so credentials stay out of the output.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}
