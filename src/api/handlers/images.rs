use crate::AppState;
use crate::api::error::AppError;
use crate::models::{ImageRequest, PublishedImage};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

#[utoipa::path(
    post,
    path = "/images",
    request_body = ImageRequest,
    responses(
        (status = 201, description = "Image and placeholder published", body = PublishedImage),
        (status = 400, description = "Invalid source, label or base64 payload"),
        (status = 422, description = "Source is not a decodable image"),
        (status = 502, description = "Fetching the source or uploading to the store failed")
    ),
    tag = "images"
)]
pub async fn publish_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublishedImage>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    tracing::info!("📸 Publishing image '{}'", request.label);
    let published = state.pipeline.run(&request).await?;

    Ok((StatusCode::CREATED, Json(published)))
}
