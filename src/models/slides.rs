use crate::api::error::FieldError;
use crate::entities::product_slides;
use crate::services::pagination::PageInfo;
use crate::utils::validation::flatten_errors;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct Specification {
    #[validate(length(min = 1, message = "El campo * no puede estar vacío."))]
    pub specification_title: String,
    #[validate(length(min = 1, message = "El campo * no puede estar vacío."))]
    pub specification_desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct SlideInfo {
    #[validate(length(min = 1, message = "El campo * no puede estar vacío."))]
    pub slide_title: String,
    #[validate(length(min = 1, message = "El campo * no puede estar vacío."))]
    pub slide_desc: String,
    #[validate(nested)]
    pub specifications: Vec<Specification>,
}

/// Text part of a product slide submission; the banner arrives as a file.
#[derive(Debug, Clone, Validate)]
pub struct ProductSlideInput {
    #[validate(length(min = 1, message = "El campo * no puede estar vacío."))]
    pub title: String,
    #[validate(length(min = 1, message = "El campo * no puede estar vacío."))]
    pub desc: String,
    #[validate(nested)]
    pub slide_info: SlideInfo,
}

impl ProductSlideInput {
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        self.validate().map_err(|e| flatten_errors(&e))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSlideResponse {
    pub id: String,
    pub title: String,
    pub desc: String,
    pub banner: String,
    #[serde(rename = "slideInfo")]
    #[schema(value_type = SlideInfo)]
    pub slide_info: serde_json::Value,
}

impl From<product_slides::Model> for ProductSlideResponse {
    fn from(model: product_slides::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            desc: model.description,
            banner: model.banner,
            slide_info: model.slide_info,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSlideListResponse {
    pub total: u64,
    pub num_pages: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub results: Vec<ProductSlideResponse>,
}

impl ProductSlideListResponse {
    pub fn new(page: PageInfo, results: Vec<ProductSlideResponse>) -> Self {
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
pub struct ProductSlideQuery {
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde(default = "default_slide_limit")]
    pub limit: i64,
    #[param(default = 1, minimum = 1)]
    #[serde(default = "default_page")]
    pub page: i64,
    /// Case-insensitive title search (3 characters or more)
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadSlideQuery {
    /// Upload token (name digest) or content digest of the slide image
    pub hash: String,
}

fn default_slide_limit() -> i64 {
    10
}

pub(crate) fn default_page() -> i64 {
    1
}
