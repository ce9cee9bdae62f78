use crate::AppState;
use crate::api::error::AppError;
use crate::models::*;
use crate::services::rating_service::RatingService;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingCreatedResponse {
    pub rating: String,
}

#[utoipa::path(
    get,
    path = "/api/rating",
    params(RatingQuery),
    responses(
        (status = 200, description = "Paginated ratings with the overall average", body = RatingListResponse)
    ),
    tag = "ratings"
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    query: Result<Query<RatingQuery>, QueryRejection>,
) -> Result<Json<RatingListResponse>, AppError> {
    let Query(query) = query?;
    let ratings = RatingService::list(&state.db, query.limit, query.page, &query.comment).await?;
    Ok(Json(ratings))
}

#[utoipa::path(
    post,
    path = "/api/rating",
    request_body = RatingInput,
    responses(
        (status = 201, description = "Rating stored", body = RatingCreatedResponse),
        (status = 422, description = "Invalid rating")
    ),
    tag = "ratings"
)]
pub async fn create_rating(
    State(state): State<AppState>,
    payload: Result<Json<RatingInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RatingCreatedResponse>), AppError> {
    let Json(input) = payload?;
    RatingService::create(&state.db, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RatingCreatedResponse {
            rating: "OK".to_string(),
        }),
    ))
}
