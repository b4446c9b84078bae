use super::dto::{KeyOutcomeResponse, KeyQuery, KeyResponse, UpdateKeyRequest};
use super::model::User;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Extension, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::info;
use validator::Validate;

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Notify that a spot's source video finished uploading; queues transcoding.
/// May wait while the transcoding queue is full.
#[utoipa::path(
    post,
    path = "/api/v1/spots/{id}/uploaded",
    params(
        ("id" = u64, Path, description = "Spot ID")
    ),
    responses(
        (status = 202, description = "Transcoding queued", body = ApiResponse<String>),
        (status = 400, description = "Invalid spot id"),
        (status = 503, description = "Transcoder unavailable")
    ),
    tag = "Spots",
    security(("bearer_auth" = []))
)]
pub async fn spot_uploaded(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    info!("Spot {} uploaded by user {}", id, user.id);

    match state.transcoder.enqueue(id).await {
        Ok(()) => ApiSuccess(
            ApiResponse::success(id.to_string(), "Transcoding queued"),
            StatusCode::ACCEPTED,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// HLS playlist with presigned segment URLs
#[utoipa::path(
    get,
    path = "/api/v1/spots/{id}/video/playlist",
    params(
        ("id" = u64, Path, description = "Spot ID"),
        KeyQuery
    ),
    responses(
        (status = 200, description = "HLS playlist", content_type = "application/vnd.apple.mpegurl", body = String),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Key was issued for another spot"),
        (status = 404, description = "Spot was never transcoded")
    ),
    tag = "Spots",
    security(("bearer_auth" = []))
)]
pub async fn get_spot_playlist(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.transcoder.get_manifest(id).await {
        Ok(playlist) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)],
            playlist,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error getting spot stream playlist: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Issue, extend or revoke (expiration = 0) the spot's public key
#[utoipa::path(
    patch,
    path = "/api/v1/spots/{id}/public-key",
    params(
        ("id" = u64, Path, description = "Spot ID")
    ),
    request_body = UpdateKeyRequest,
    responses(
        (status = 200, description = "Key updated", body = ApiResponse<KeyOutcomeResponse>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Spots",
    security(("bearer_auth" = []))
)]
pub async fn update_public_key(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateKeyRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match state.keys.issue_or_extend(id, req.expiration, &user).await {
        Ok(outcome) => ApiSuccess(
            ApiResponse::success(KeyOutcomeResponse::from(outcome), "Key updated"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/spots/{id}/public-key",
    params(
        ("id" = u64, Path, description = "Spot ID")
    ),
    responses(
        (status = 200, description = "Current public key", body = ApiResponse<KeyResponse>),
        (status = 403, description = "Key is expired"),
        (status = 404, description = "Key not found")
    ),
    tag = "Spots",
    security(("bearer_auth" = []))
)]
pub async fn get_public_key(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.keys.fetch(id, &user).await {
        Ok(key) => ApiSuccess(
            ApiResponse::success(KeyResponse::from(key), "Key retrieved"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
