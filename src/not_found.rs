//! The response for requests that do not match any route.

use axum::response::{IntoResponse, Response};

use crate::Error;

/// The fallback route handler, responds with 404 and `{"message": "Not found"}`.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Get the JSON 404 response.
pub fn get_404_not_found_response() -> Response {
    Error::NotFound.into_response()
}
