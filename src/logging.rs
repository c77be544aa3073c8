//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of body bytes to include in `info` level logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_request(&parts, &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Get the first [LOG_BODY_LENGTH_LIMIT] bytes of `body` as text.
///
/// Cutting a multi-byte character in half leaves a replacement character at
/// the end instead of panicking.
fn truncated_text(body: &[u8]) -> String {
    let end = body.len().min(LOG_BODY_LENGTH_LIMIT);

    String::from_utf8_lossy(&body[..end]).into_owned()
}

fn log_request(parts: &axum::http::request::Parts, body: &Bytes) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncated_text(body)
        );
        tracing::debug!("Full request body: {:?}", String::from_utf8_lossy(body));
    } else {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:?}",
            String::from_utf8_lossy(body)
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &Bytes) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            truncated_text(body)
        );
        tracing::debug!("Full response body: {:?}", String::from_utf8_lossy(body));
    } else {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:?}",
            String::from_utf8_lossy(body)
        );
    }
}
