use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::models::{ProductSlideInput, ProductSlideListResponse, ProductSlideResponse};
use crate::services::file_store::is_unique_violation;
use crate::services::pagination::{paginate, search_key};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Public URL of a stored slide banner.
pub fn banner_url(token: &str) -> String {
    format!("/api/read_slide?hash={}", token)
}

pub struct SlideService;

impl SlideService {
    pub async fn list(
        db: &DatabaseConnection,
        limit: i64,
        page: i64,
        title: &str,
    ) -> Result<ProductSlideListResponse, AppError> {
        let (page, slides) = paginate::<ProductSlides, _, _>(
            db,
            product_slides::Column::TitleSearch,
            title,
            limit,
            page,
        )
        .await?;

        Ok(ProductSlideListResponse::new(
            page,
            slides.into_iter().map(ProductSlideResponse::from).collect(),
        ))
    }

    pub async fn find_by_title(
        db: &DatabaseConnection,
        title: &str,
    ) -> Result<Option<product_slides::Model>, AppError> {
        let slide = ProductSlides::find()
            .filter(product_slides::Column::TitleSearch.eq(search_key(title)))
            .one(db)
            .await?;
        Ok(slide)
    }

    /// Returns the slide with the same title (ignoring case) or inserts a new one.
    pub async fn get_or_create(
        db: &DatabaseConnection,
        input: ProductSlideInput,
        banner: String,
    ) -> Result<product_slides::Model, AppError> {
        if let Some(existing) = Self::find_by_title(db, &input.title).await? {
            tracing::info!("Product slide '{}' already exists", existing.title);
            return Ok(existing);
        }

        let slide_info = serde_json::to_value(&input.slide_info)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let slide = product_slides::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(input.title.trim().to_string()),
            title_search: Set(search_key(&input.title)),
            description: Set(input.desc),
            banner: Set(banner),
            slide_info: Set(slide_info),
            created_at: Set(Some(Utc::now())),
        };

        match slide.insert(db).await {
            Ok(model) => {
                tracing::info!("Created product slide '{}'", model.title);
                Ok(model)
            }
            Err(e) if is_unique_violation(&e) => Self::find_by_title(db, &input.title)
                .await?
                .ok_or_else(|| AppError::Internal(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
