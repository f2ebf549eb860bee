pub mod api;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::services::pipeline::ImagePipeline;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::images::publish_image,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::ImageRequest,
            models::PublishedImage,
            models::PublishedObject,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "images", description = "Image publishing endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ImagePipeline>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/images", post(api::handlers::images::publish_image))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
