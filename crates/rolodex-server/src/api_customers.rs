//! Customer endpoints.

use crate::api::{parse_id, with_connection, ApiError, DataResponse, MessageResponse};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    Json,
};
use rolodex_directory::{
    create_customer, delete_customer, get_customer, list_customers, update_customer, Customer,
    CustomerFilter, CustomerInput, CustomerSummary, NewCustomer, Pagination,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for `GET /api/customers`.
///
/// `page` and `limit` are kept as strings so a malformed value gets a
/// field-specific message.
#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
}

/// Response body for a successful customer creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerCreatedResponse {
    pub message: String,
    pub customer_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,
}

fn parse_page_param(name: &str, value: Option<&str>) -> Result<Option<u32>, ApiError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{name} must be a positive integer"))),
    }
}

/// POST /api/customers
pub async fn create_customer_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<Json<CustomerCreatedResponse>, ApiError> {
    let Json(payload) = payload?;

    let created = with_connection(&state, move |conn| create_customer(conn, &payload)).await?;

    let message = if created.address_id.is_some() {
        "Customer + Address created"
    } else {
        "Customer created (no address)"
    };
    Ok(Json(CustomerCreatedResponse {
        message: message.to_string(),
        customer_id: created.customer_id,
        address_id: created.address_id,
    }))
}

/// GET /api/customers
///
/// Paginated (`page`, `limit`; defaults 1 and 5) with optional `city`,
/// `state` and `pin_code` filters on the customers' addresses.
pub async fn list_customers_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<ListCustomersQuery>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<CustomerSummary>>>, ApiError> {
    let Query(params) = params?;
    let page = Pagination::new(
        parse_page_param("page", params.page.as_deref())?,
        parse_page_param("limit", params.limit.as_deref())?,
    )?;
    let filter = CustomerFilter {
        city: params.city,
        state: params.state,
        pin_code: params.pin_code,
    };

    let customers = with_connection(&state, move |conn| list_customers(conn, &filter, page)).await?;
    Ok(Json(DataResponse::success(customers)))
}

/// GET /api/customers/:id
pub async fn get_customer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Customer>>, ApiError> {
    let id = parse_id(&id, "customer")?;
    let customer = with_connection(&state, move |conn| get_customer(conn, id)).await?;
    Ok(Json(DataResponse::success(customer)))
}

/// PUT /api/customers/:id
///
/// Succeeds even when no customer has this id.
pub async fn update_customer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "customer")?;
    let Json(payload) = payload?;

    with_connection(&state, move |conn| update_customer(conn, id, &payload)).await?;
    Ok(Json(MessageResponse::new("Customer updated")))
}

/// DELETE /api/customers/:id
///
/// Removes the customer and all of its addresses. Succeeds even when no
/// customer has this id.
pub async fn delete_customer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "customer")?;
    with_connection(&state, move |conn| delete_customer(conn, id)).await?;
    Ok(Json(MessageResponse::new("Customer deleted")))
}
