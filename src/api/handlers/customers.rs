use crate::AppState;
use crate::api::error::AppError;
use crate::models::*;
use crate::services::customer_service::CustomerService;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

#[utoipa::path(
    post,
    path = "/api/customer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Customer and products stored", body = CreateCustomerResponse),
        (status = 422, description = "Invalid customer data")
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<Json<CreateCustomerResponse>, AppError> {
    let Json(request) = payload?;
    let hash = CustomerService::create(&state.db, request).await?;
    Ok(Json(CreateCustomerResponse { hash }))
}

#[utoipa::path(
    get,
    path = "/api/track",
    params(TrackQuery),
    responses(
        (status = 200, description = "Order progress", body = TrackResponse)
    ),
    tag = "customers"
)]
pub async fn track_order(
    State(state): State<AppState>,
    query: Result<Query<TrackQuery>, QueryRejection>,
) -> Result<Json<TrackResponse>, AppError> {
    let Query(query) = query?;
    let progress = CustomerService::track(&state.db, &query.track).await?;
    Ok(Json(progress))
}
