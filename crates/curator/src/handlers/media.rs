use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use curator_core::pagination::Page;
use curator_core::records::{
    validate_media, CreateMediaRequest, MediaDto, MediaNodeDto, MoveNodeRequest,
    UpdateMediaRequest,
};
use curator_core::storage::RepositoryError;

use crate::{
    handlers::{params::ListParams, AppError},
    state::AppState,
};

/// List media, one page at a time (GET /api/media).
pub async fn list_media(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<MediaDto>>, AppError> {
    let request = params.page_request()?;
    let page = state.media.list_media_paginated(&request).await?;

    Ok(Json(page.map(MediaDto::from)))
}

/// Root folders and files (GET /api/media/roots).
pub async fn list_root_media(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<MediaDto>>, AppError> {
    let request = params.page_request()?;
    let page = state
        .media
        .list_media_children_paginated(None, &request)
        .await?;

    Ok(Json(page.map(MediaDto::from)))
}

/// Direct children of a media folder (GET /api/media/{id}/children).
pub async fn list_media_children(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<MediaDto>>, AppError> {
    let request = params.page_request()?;
    let page = state
        .media
        .list_media_children_paginated(Some(id), &request)
        .await?;

    Ok(Json(page.map(MediaDto::from)))
}

/// Create a media record, as a root or under `parentId` (POST /api/media).
pub async fn create_media(
    State(state): State<AppState>,
    Json(payload): Json<CreateMediaRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (media, parent_id) = payload.into_media();
    validate_media(&media).map_err(RepositoryError::from)?;

    let created = state.media.create_media(&media, parent_id).await?;

    tracing::info!(
        media_id = %created.id,
        parent_id = ?parent_id,
        left = created.position.left,
        right = created.position.right,
        "Created media"
    );

    Ok((StatusCode::CREATED, Json(MediaNodeDto::from(created))))
}

/// Get a single media record by ID (GET /api/media/{id}).
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaDto>, AppError> {
    let media = state
        .media
        .get_media(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Media", id))?;

    Ok(Json(MediaDto::from(media)))
}

/// Get a media record by content hash (GET /api/media/hash/{hash}).
pub async fn get_media_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<MediaDto>, AppError> {
    let media = state
        .media
        .get_media_by_hash(&hash)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Media", &hash))?;

    Ok(Json(MediaDto::from(media)))
}

/// Get a media record by stored file name (GET /api/media/file/{file_name}).
pub async fn get_media_by_file_name(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Json<MediaDto>, AppError> {
    let media = state
        .media
        .get_media_by_file_name(&file_name)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Media", &file_name))?;

    Ok(Json(MediaDto::from(media)))
}

/// Update a media record's attributes (PUT /api/media/{id}).
pub async fn update_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMediaRequest>,
) -> Result<Json<MediaDto>, AppError> {
    let mut media = state
        .media
        .get_media(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Media", id))?;

    payload.apply_to(&mut media);
    validate_media(&media).map_err(RepositoryError::from)?;
    media.updated_at = Utc::now();

    state.media.update_media(&media).await?;

    tracing::info!(media_id = %id, "Updated media");

    Ok(Json(MediaDto::from(media)))
}

/// Re-parent a media record with its subtree (POST /api/media/{id}/move).
pub async fn move_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveNodeRequest>,
) -> Result<Json<MediaNodeDto>, AppError> {
    let moved = state.media.move_media(id, payload.parent_id).await?;

    tracing::info!(media_id = %id, parent_id = ?payload.parent_id, "Moved media");

    Ok(Json(MediaNodeDto::from(moved)))
}

/// Soft-delete a media record and everything under it (DELETE /api/media/{id}).
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.media.delete_media(id).await?;

    tracing::info!(media_id = %id, "Deleted media");

    Ok(StatusCode::NO_CONTENT)
}

/// The node and its live descendants in pre-order (GET /api/media/{id}/subtree).
pub async fn media_subtree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MediaNodeDto>>, AppError> {
    let nodes = state.media.media_subtree(id).await?;
    Ok(Json(nodes.into_iter().map(MediaNodeDto::from).collect()))
}

/// Path from the root down to the node's parent (GET /api/media/{id}/ancestors).
pub async fn media_ancestors(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MediaNodeDto>>, AppError> {
    let nodes = state.media.media_ancestors(id).await?;
    Ok(Json(nodes.into_iter().map(MediaNodeDto::from).collect()))
}
