pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::Settings;
use crate::services::file_store::FileStore;
use crate::services::storage::StorageService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for the text parts and boundaries of a multipart upload.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::slides::list_product_slides,
        api::handlers::slides::create_product_slide,
        api::handlers::slides::read_slide,
        api::handlers::ratings::list_ratings,
        api::handlers::ratings::create_rating,
        api::handlers::customers::create_customer,
        api::handlers::customers::track_order,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::error::FieldError,
            api::handlers::slides::SlideCreatedResponse,
            api::handlers::ratings::RatingCreatedResponse,
            api::handlers::health::HealthResponse,
            models::Specification,
            models::SlideInfo,
            models::ProductSlideResponse,
            models::ProductSlideListResponse,
            models::RatingInput,
            models::RatingResponse,
            models::RatingListResponse,
            models::CustomerInput,
            models::ProductInput,
            models::CreateCustomerRequest,
            models::CreateCustomerResponse,
            models::TrackResponse,
            services::pagination::PageInfo,
        )
    ),
    tags(
        (name = "slides", description = "Home page product slides"),
        (name = "ratings", description = "Customer ratings"),
        (name = "customers", description = "Customer orders and tracking"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub file_store: Arc<FileStore>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, settings: Settings) -> Self {
        let file_store = Arc::new(FileStore::new(
            db.clone(),
            storage.clone(),
            settings.clone(),
        ));
        Self {
            db,
            storage,
            file_store,
            settings,
        }
    }
}

pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let allow_origin = if settings.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = settings
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HOST,
            header::USER_AGENT,
        ])
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state
        .settings
        .max_upload_size
        .saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.settings);

    let api = Router::new()
        .route(
            "/product_slide",
            get(api::handlers::slides::list_product_slides)
                .post(api::handlers::slides::create_product_slide),
        )
        .route("/read_slide", get(api::handlers::slides::read_slide))
        .route(
            "/rating",
            get(api::handlers::ratings::list_ratings).post(api::handlers::ratings::create_rating),
        )
        .route(
            "/customer",
            axum::routing::post(api::handlers::customers::create_customer),
        )
        .route("/track", get(api::handlers::customers::track_order));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}
