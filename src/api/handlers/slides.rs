use crate::AppState;
use crate::api::error::{AppError, FieldError};
use crate::models::*;
use crate::services::file_store::{PendingUpload, StorageCategory};
use crate::services::slide_service::{SlideService, banner_url};
use crate::utils::validation::MSG_REQUIRED;
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, State, multipart::MultipartError, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::{ReaderStream, StreamReader};
use utoipa::ToSchema;

pub const MSG_INVALID_SLIDE_INFO: &str = "La información del slide no es válida";

#[derive(Debug, Serialize, ToSchema)]
pub struct SlideCreatedResponse {
    pub slide: String,
}

#[utoipa::path(
    get,
    path = "/api/product_slide",
    params(ProductSlideQuery),
    responses(
        (status = 200, description = "Paginated product slides", body = ProductSlideListResponse),
        (status = 422, description = "Invalid query parameters")
    ),
    tag = "slides"
)]
pub async fn list_product_slides(
    State(state): State<AppState>,
    query: Result<Query<ProductSlideQuery>, QueryRejection>,
) -> Result<Json<ProductSlideListResponse>, AppError> {
    let Query(query) = query?;
    let slides = SlideService::list(&state.db, query.limit, query.page, &query.title).await?;
    Ok(Json(slides))
}

#[utoipa::path(
    post,
    path = "/api/product_slide",
    request_body(
        content = Object,
        description = "Fields `title`, `desc`, `slideInfo` (JSON text) and the banner `file`",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 201, description = "Slide stored", body = SlideCreatedResponse),
        (status = 400, description = "Invalid slide fields"),
        (status = 409, description = "Banner already uploaded"),
        (status = 413, description = "Banner too large"),
        (status = 415, description = "Banner type not allowed")
    ),
    tag = "slides"
)]
pub async fn create_product_slide(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SlideCreatedResponse>), AppError> {
    let mut title: Option<String> = None;
    let mut desc: Option<String> = None;
    let mut slide_info: Option<String> = None;
    let mut banner: Option<PendingUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "desc" => desc = Some(field.text().await.map_err(multipart_error)?),
            "slideInfo" => slide_info = Some(field.text().await.map_err(multipart_error)?),
            "file" if banner.is_none() => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let declared_size = field
                    .headers()
                    .get(header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(0);

                let reader = StreamReader::new(field.map_err(std::io::Error::other));
                banner = Some(
                    state
                        .file_store
                        .prepare(reader, declared_size, content_type.as_deref(), &filename)
                        .await?,
                );
            }
            _ => {}
        }
    }

    // The banner stays in staging until the text fields are known to be valid.
    let input = parse_slide_input(title, desc, slide_info)?;
    let banner = banner.ok_or_else(|| {
        AppError::BadRequest(vec![FieldError::new("file", MSG_REQUIRED)])
    })?;
    let token = state
        .file_store
        .commit(banner, StorageCategory::Slides)
        .await?;

    SlideService::get_or_create(&state.db, input, banner_url(&token)).await?;

    Ok((
        StatusCode::CREATED,
        Json(SlideCreatedResponse {
            slide: "OK".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/read_slide",
    params(ReadSlideQuery),
    responses(
        (status = 200, description = "Slide image stream"),
        (status = 404, description = "Unknown digest"),
        (status = 410, description = "Blob no longer on disk"),
        (status = 500, description = "Blob failed its integrity check")
    ),
    tag = "slides"
)]
pub async fn read_slide(
    State(state): State<AppState>,
    query: Result<Query<ReadSlideQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let path = state
        .file_store
        .resolve(&query.hash, StorageCategory::Slides)
        .await?;

    let file = tokio::fs::File::open(&path).await?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        [(header::CONTENT_TYPE, content_type.to_string())],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

fn parse_slide_input(
    title: Option<String>,
    desc: Option<String>,
    slide_info: Option<String>,
) -> Result<ProductSlideInput, AppError> {
    let slide_info: SlideInfo = serde_json::from_str(slide_info.as_deref().unwrap_or_default())
        .map_err(|_| {
            AppError::BadRequest(vec![FieldError::new("slideInfo", MSG_INVALID_SLIDE_INFO)])
        })?;

    let input = ProductSlideInput {
        title: title.unwrap_or_default(),
        desc: desc.unwrap_or_default(),
        slide_info,
    };
    input.check().map_err(AppError::BadRequest)?;
    Ok(input)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(vec![FieldError::general(e.body_text())])
    }
}
