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
    validate_taxonomy, CreateTaxonomyRequest, MoveNodeRequest, TaxonomyDto, TaxonomyNodeDto,
    UpdateTaxonomyRequest,
};
use curator_core::storage::RepositoryError;

use crate::{
    handlers::{params::ListParams, AppError},
    state::AppState,
};

/// List taxonomies, one page at a time (GET /api/taxonomies).
pub async fn list_taxonomies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<TaxonomyDto>>, AppError> {
    let request = params.page_request()?;
    let page = state.taxonomies.list_taxonomies_paginated(&request).await?;

    Ok(Json(page.map(TaxonomyDto::from)))
}

/// Top-level taxonomies (GET /api/taxonomies/roots).
pub async fn list_root_taxonomies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<TaxonomyDto>>, AppError> {
    let request = params.page_request()?;
    let page = state
        .taxonomies
        .list_taxonomy_children_paginated(None, &request)
        .await?;

    Ok(Json(page.map(TaxonomyDto::from)))
}

/// Direct children of a taxonomy (GET /api/taxonomies/{id}/children).
pub async fn list_taxonomy_children(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<TaxonomyDto>>, AppError> {
    let request = params.page_request()?;
    let page = state
        .taxonomies
        .list_taxonomy_children_paginated(Some(id), &request)
        .await?;

    Ok(Json(page.map(TaxonomyDto::from)))
}

/// Create a taxonomy (POST /api/taxonomies).
pub async fn create_taxonomy(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaxonomyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (taxonomy, parent_id) = payload.into_taxonomy();
    validate_taxonomy(&taxonomy).map_err(RepositoryError::from)?;

    let created = state.taxonomies.create_taxonomy(&taxonomy, parent_id).await?;

    tracing::info!(taxonomy_id = %created.id, slug = %created.slug, parent_id = ?parent_id, "Created taxonomy");

    Ok((StatusCode::CREATED, Json(TaxonomyNodeDto::from(created))))
}

/// Get a single taxonomy by ID (GET /api/taxonomies/{id}).
pub async fn get_taxonomy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaxonomyDto>, AppError> {
    let taxonomy = state
        .taxonomies
        .get_taxonomy(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Taxonomy", id))?;

    Ok(Json(TaxonomyDto::from(taxonomy)))
}

/// Get a taxonomy by its public slug (GET /api/taxonomies/slug/{slug}).
pub async fn get_taxonomy_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TaxonomyDto>, AppError> {
    let taxonomy = state
        .taxonomies
        .get_taxonomy_by_slug(&slug)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Taxonomy", &slug))?;

    Ok(Json(TaxonomyDto::from(taxonomy)))
}

/// Update a taxonomy's attributes (PUT /api/taxonomies/{id}).
pub async fn update_taxonomy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaxonomyRequest>,
) -> Result<Json<TaxonomyDto>, AppError> {
    let mut taxonomy = state
        .taxonomies
        .get_taxonomy(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Taxonomy", id))?;

    payload.apply_to(&mut taxonomy);
    validate_taxonomy(&taxonomy).map_err(RepositoryError::from)?;
    taxonomy.updated_at = Utc::now();

    state.taxonomies.update_taxonomy(&taxonomy).await?;

    tracing::info!(taxonomy_id = %id, "Updated taxonomy");

    Ok(Json(TaxonomyDto::from(taxonomy)))
}

/// Re-parent a taxonomy with its subtree (POST /api/taxonomies/{id}/move).
pub async fn move_taxonomy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveNodeRequest>,
) -> Result<Json<TaxonomyNodeDto>, AppError> {
    let moved = state.taxonomies.move_taxonomy(id, payload.parent_id).await?;

    tracing::info!(taxonomy_id = %id, parent_id = ?payload.parent_id, "Moved taxonomy");

    Ok(Json(TaxonomyNodeDto::from(moved)))
}

/// Soft-delete a taxonomy and its descendants (DELETE /api/taxonomies/{id}).
pub async fn delete_taxonomy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.taxonomies.delete_taxonomy(id).await?;

    tracing::info!(taxonomy_id = %id, "Deleted taxonomy");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn taxonomy_subtree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TaxonomyNodeDto>>, AppError> {
    let nodes = state.taxonomies.taxonomy_subtree(id).await?;
    Ok(Json(nodes.into_iter().map(TaxonomyNodeDto::from).collect()))
}

pub async fn taxonomy_ancestors(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TaxonomyNodeDto>>, AppError> {
    let nodes = state.taxonomies.taxonomy_ancestors(id).await?;
    Ok(Json(nodes.into_iter().map(TaxonomyNodeDto::from).collect()))
}
