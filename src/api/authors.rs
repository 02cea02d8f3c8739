//! Author endpoints
//!
//! Listing and the dropdown variant are public; everything else requires an
//! authenticated admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{AuthorDto, AuthorOption, AuthorWithBooks, CreateAuthor, UpdateAuthor},
};

use super::{AuthenticatedUser, MessageResponse};

/// List all authors with book counts
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "List of authors", body = Vec<AuthorDto>)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<AuthorDto>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// List authors for selection dropdowns
#[utoipa::path(
    get,
    path = "/authors/dropdown",
    tag = "authors",
    responses(
        (status = 200, description = "Author id/name pairs", body = Vec<AuthorOption>)
    )
)]
pub async fn list_authors_dropdown(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<AuthorOption>>> {
    let options = state.services.catalog.list_author_options().await?;
    Ok(Json(options))
}

/// Get author details with the full book list
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorWithBooks),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorWithBooks>> {
    claims.require_admin()?;

    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = AuthorDto),
        (status = 400, description = "Invalid input or duplicate name")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(author): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<AuthorDto>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_author(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = AuthorDto),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(author): Json<UpdateAuthor>,
) -> AppResult<Json<AuthorDto>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_author(id, author).await?;
    Ok(Json(updated))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author deleted", body = MessageResponse),
        (status = 400, description = "Author still has books"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_admin()?;

    state.services.catalog.delete_author(id).await?;
    Ok(Json(MessageResponse {
        message: "Author deleted successfully".to_string(),
    }))
}
