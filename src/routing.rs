//! Application router configuration.

use axum::{
    Router,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{
    AppState, Error, endpoints,
    transaction::{create_transaction_endpoint, list_transactions_endpoint},
};

/// The origin of the frontend during local development.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Return a router with all the app's routes.
///
/// Cross-origin requests are only accepted from `allowed_origin`.
pub fn build_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(cors_layer(allowed_origin))
        .with_state(state)
}

/// Allow credentialed requests with any method and header from `allowed_origin`.
///
/// The origin is matched exactly. Requests from any other origin get no
/// `Access-Control-Allow-Origin` header.
///
/// Browsers reject a wildcard `Access-Control-Allow-Methods` or
/// `Access-Control-Allow-Headers` on credentialed requests, so the requested
/// method and headers are mirrored back instead.
fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([allowed_origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
