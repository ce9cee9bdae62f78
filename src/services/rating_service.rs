use crate::api::error::{AppError, FieldError};
use crate::entities::{prelude::*, *};
use crate::models::{RatingInput, RatingListResponse, RatingResponse};
use crate::services::pagination::{paginate, search_key};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set};
use uuid::Uuid;

/// Ratings considered when computing the average.
pub const AVERAGE_SAMPLE: u64 = 1000;

pub const MSG_UNKNOWN_OWNER: &str = "El cliente especificado no existe.";

pub struct RatingService;

impl RatingService {
    pub async fn list(
        db: &DatabaseConnection,
        limit: i64,
        page: i64,
        comment: &str,
    ) -> Result<RatingListResponse, AppError> {
        let (page, ratings) =
            paginate::<Ratings, _, _>(db, ratings::Column::CommentSearch, comment, limit, page)
                .await?;
        let average = Self::average(db).await?;

        Ok(RatingListResponse::new(
            page,
            ratings
                .into_iter()
                .map(|rating| RatingResponse::new(rating, average))
                .collect(),
        ))
    }

    /// Mean qualification over the first [`AVERAGE_SAMPLE`] ratings, 0 when there are none.
    pub async fn average(db: &DatabaseConnection) -> Result<f64, AppError> {
        let qualifications: Vec<f64> = Ratings::find()
            .select_only()
            .column(ratings::Column::Qualification)
            .limit(AVERAGE_SAMPLE)
            .into_tuple()
            .all(db)
            .await?;

        if qualifications.is_empty() {
            return Ok(0.0);
        }
        Ok(qualifications.iter().sum::<f64>() / qualifications.len() as f64)
    }

    pub async fn create(
        db: &DatabaseConnection,
        input: RatingInput,
    ) -> Result<ratings::Model, AppError> {
        let input = input.check().map_err(AppError::Validation)?;

        if let Some(owner) = &input.owner {
            if Customers::find_by_id(owner.clone()).one(db).await?.is_none() {
                return Err(AppError::Validation(vec![FieldError::new(
                    "owner",
                    MSG_UNKNOWN_OWNER,
                )]));
            }
        }

        let rating = ratings::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            comment_search: Set(search_key(&input.comment)),
            comment: Set(input.comment),
            qualification: Set(input.qualification),
            owner: Set(input.owner),
            created_at: Set(Some(Utc::now())),
        };

        let rating = rating.insert(db).await?;
        tracing::info!("Stored rating {} ({})", rating.id, rating.qualification);
        Ok(rating)
    }
}
