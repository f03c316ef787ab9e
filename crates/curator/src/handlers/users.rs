use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use curator_core::pagination::Page;
use curator_core::records::{validate_user, CreateUserRequest, UpdateUserRequest, UserDto};
use curator_core::storage::RepositoryError;

use crate::{
    handlers::{params::ListParams, AppError},
    state::AppState,
};

/// Exactly one of these selects the user to look up.
#[derive(Debug, Default, Deserialize)]
pub struct UserLookup {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
}

/// List users, one page at a time (GET /api/users).
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<UserDto>>, AppError> {
    let request = params.page_request()?;
    let page = state.users.list_users_paginated(&request).await?;

    Ok(Json(page.map(UserDto::from)))
}

/// Create a user (POST /api/users).
///
/// Email and phone are checked up front so the caller gets a 409 naming the
/// taken field; the store's unique constraints still catch races.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = payload.into_user();
    validate_user(&user).map_err(RepositoryError::from)?;

    if state.users.email_exists(&user.email).await? {
        return Err(RepositoryError::conflict("User", "email").into());
    }
    if let Some(phone) = &user.phone {
        if state.users.phone_exists(phone).await? {
            return Err(RepositoryError::conflict("User", "phone").into());
        }
    }

    state.users.create_user(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Created user");

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Get a single user by ID (GET /api/users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, AppError> {
    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("User", id))?;

    Ok(Json(UserDto::from(user)))
}

/// Find a user by email, phone or username (GET /api/users/lookup).
pub async fn lookup_user(
    State(state): State<AppState>,
    Query(lookup): Query<UserLookup>,
) -> Result<Json<UserDto>, AppError> {
    let (field, user) = match lookup {
        UserLookup {
            email: Some(email), ..
        } => (email.clone(), state.users.get_user_by_email(&email).await?),
        UserLookup {
            phone: Some(phone), ..
        } => (phone.clone(), state.users.get_user_by_phone(&phone).await?),
        UserLookup {
            username: Some(username),
            ..
        } => (
            username.clone(),
            state.users.get_user_by_username(&username).await?,
        ),
        _ => {
            return Err(RepositoryError::InvalidInput(
                "one of email, phone or username is required".to_string(),
            )
            .into())
        }
    };

    let user = user.ok_or_else(|| RepositoryError::not_found("User", field))?;
    Ok(Json(UserDto::from(user)))
}

/// Update a user by ID (PUT /api/users/{id}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserDto>, AppError> {
    let mut user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("User", id))?;

    payload.apply_to(&mut user);
    validate_user(&user).map_err(RepositoryError::from)?;
    user.updated_at = Utc::now();

    state.users.update_user(&user).await?;

    tracing::info!(user_id = %id, "Updated user");

    Ok(Json(UserDto::from(user)))
}

/// Soft-delete a user by ID (DELETE /api/users/{id}).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(id).await?;

    tracing::info!(user_id = %id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}
