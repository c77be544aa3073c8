//! Application router configuration.

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{CONTENT_TYPE, InvalidHeaderValue},
    },
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    analytics::get_analytics_endpoint,
    endpoints,
    expense::{create_expense_endpoint, list_expenses_endpoint},
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSE_ANALYTICS, get(get_analytics_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Create a CORS layer that allows credentialed GET and POST requests with a
/// JSON body from `allowed_origin`, e.g. "http://localhost:3000".
///
/// # Errors
/// Returns an error if `allowed_origin` is not a valid header value.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = allowed_origin.parse::<HeaderValue>()?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]))
}
