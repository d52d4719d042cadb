//! Address endpoints.

use crate::api::{parse_id, with_connection, ApiError, DataResponse, MessageResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use rolodex_directory::{
    create_address, delete_address, list_addresses, update_address, Address, AddressInput,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response body for a successful address creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressCreatedResponse {
    pub message: String,
    pub address_id: i64,
}

/// POST /api/customers/:id/addresses
pub async fn create_address_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(customer_id): Path<String>,
    payload: Result<Json<AddressInput>, JsonRejection>,
) -> Result<Json<AddressCreatedResponse>, ApiError> {
    let customer_id = parse_id(&customer_id, "customer")?;
    let Json(payload) = payload?;

    let address_id =
        with_connection(&state, move |conn| create_address(conn, customer_id, &payload)).await?;

    Ok(Json(AddressCreatedResponse {
        message: "Address added".to_string(),
        address_id,
    }))
}

/// GET /api/customers/:id/addresses
pub async fn list_addresses_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<DataResponse<Vec<Address>>>, ApiError> {
    let customer_id = parse_id(&customer_id, "customer")?;
    let addresses = with_connection(&state, move |conn| list_addresses(conn, customer_id)).await?;
    Ok(Json(DataResponse::success(addresses)))
}

/// PUT /api/addresses/:addressId
///
/// Succeeds even when no address has this id.
pub async fn update_address_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(address_id): Path<String>,
    payload: Result<Json<AddressInput>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let address_id = parse_id(&address_id, "address")?;
    let Json(payload) = payload?;

    with_connection(&state, move |conn| update_address(conn, address_id, &payload)).await?;
    Ok(Json(MessageResponse::new("Address updated")))
}

/// DELETE /api/addresses/:addressId
pub async fn delete_address_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(address_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let address_id = parse_id(&address_id, "address")?;
    with_connection(&state, move |conn| delete_address(conn, address_id)).await?;
    Ok(Json(MessageResponse::new("Address deleted")))
}
