//! Rolodex HTTP service: customers and their addresses over a JSON API.

pub mod api;
pub mod api_addresses;
pub mod api_customers;
pub mod config;

use api::{ApiError, MessageResponse};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Extension, Json, Router,
};
use rolodex_db::Database;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle. Each request opens and drops its own connection.
    pub db: Database,
}

/// Maximum request body size (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Status handler for `GET /`.
async fn index() -> Json<MessageResponse> {
    let now = chrono::Local::now();
    Json(MessageResponse::new(format!(
        "Server is running: {}",
        now.format("%-m/%-d/%Y, %-I:%M:%S %p")
    )))
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(
            "/api/customers",
            post(api_customers::create_customer_handler)
                .get(api_customers::list_customers_handler),
        )
        .route(
            "/api/customers/{id}",
            get(api_customers::get_customer_handler)
                .put(api_customers::update_customer_handler)
                .delete(api_customers::delete_customer_handler),
        )
        .route(
            "/api/customers/{id}/addresses",
            post(api_addresses::create_address_handler)
                .get(api_addresses::list_addresses_handler),
        )
        .route(
            "/api/addresses/{addressId}",
            put(api_addresses::update_address_handler)
                .delete(api_addresses::delete_address_handler),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
