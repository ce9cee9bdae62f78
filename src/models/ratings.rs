use crate::api::error::FieldError;
use crate::entities::ratings;
use crate::services::pagination::PageInfo;
use crate::utils::validation::MSG_REQUIRED;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::slides::default_page;

pub const MIN_QUALIFICATION: f64 = 1.0;
pub const MAX_QUALIFICATION: f64 = 5.0;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RatingInput {
    pub comment: String,
    pub qualification: f64,
    /// Customer id the rating belongs to, when known
    #[serde(default)]
    pub owner: Option<String>,
}

impl RatingInput {
    /// Rejects empty values and clamps the qualification to 1..=5.
    pub fn check(mut self) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.comment.is_empty() {
            errors.push(FieldError::new("comment", MSG_REQUIRED));
        }
        if self.qualification == 0.0 || self.qualification.is_nan() {
            errors.push(FieldError::new("qualification", MSG_REQUIRED));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        self.qualification = self.qualification.clamp(MIN_QUALIFICATION, MAX_QUALIFICATION);
        self.owner = self.owner.filter(|o| !o.trim().is_empty());
        Ok(self)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResponse {
    pub id: String,
    pub comment: String,
    pub qualification: f64,
    /// Mean qualification across stored ratings
    pub average: f64,
}

impl RatingResponse {
    pub fn new(model: ratings::Model, average: f64) -> Self {
        Self {
            id: model.id,
            comment: model.comment,
            qualification: model.qualification,
            average,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingListResponse {
    pub total: u64,
    pub num_pages: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub results: Vec<RatingResponse>,
}

impl RatingListResponse {
    pub fn new(page: PageInfo, results: Vec<RatingResponse>) -> Self {
        Self {
            total: page.total,
            num_pages: page.num_pages,
            current_page: page.current_page,
            per_page: page.per_page,
            results,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RatingQuery {
    #[param(default = 1, minimum = 1, maximum = 100)]
    #[serde(default = "default_rating_limit")]
    pub limit: i64,
    #[param(default = 1, minimum = 1)]
    #[serde(default = "default_page")]
    pub page: i64,
    /// Case-insensitive comment search (3 characters or more)
    #[serde(default)]
    pub comment: String,
}

fn default_rating_limit() -> i64 {
    1
}
