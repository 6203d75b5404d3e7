//! Handlers for authors.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use lectern_core::error::CoreError;
use lectern_core::types::DbId;
use lectern_db::models::author::{CreateAuthor, UpdateAuthor};
use lectern_db::repositories::AuthorRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/authors
pub async fn list_authors(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let authors = AuthorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: authors }))
}

/// POST /api/v1/authors
pub async fn create_author(
    State(state): State<AppState>,
    Json(input): Json<CreateAuthor>,
) -> AppResult<impl IntoResponse> {
    let author = AuthorRepo::create(&state.pool, &input).await?;
    tracing::info!(author_id = author.id, name = %author.name, "Author created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: author })))
}

/// GET /api/v1/authors/{id}
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let author = AuthorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Author",
            id,
        }))?;
    Ok(Json(DataResponse { data: author }))
}

/// PUT /api/v1/authors/{id}
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAuthor>,
) -> AppResult<impl IntoResponse> {
    let author = AuthorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Author",
            id,
        }))?;
    Ok(Json(DataResponse { data: author }))
}

/// DELETE /api/v1/authors/{id}
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !AuthorRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Author",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
