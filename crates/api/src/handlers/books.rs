//! Handlers for the book catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use lectern_core::error::CoreError;
use lectern_core::types::DbId;
use lectern_db::models::book::{CreateBook, UpdateBook};
use lectern_db::repositories::{AuthorRepo, BookRepo, LoanRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that an author exists, returning NotFound if it does not.
async fn ensure_author_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<()> {
    if AuthorRepo::find_by_id(pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Author",
            id,
        }));
    }
    Ok(())
}

/// GET /api/v1/books
///
/// List all books, newest first, with author names resolved.
pub async fn list_books(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let books = BookRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: books }))
}

/// POST /api/v1/books
pub async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<CreateBook>,
) -> AppResult<impl IntoResponse> {
    ensure_author_exists(&state.pool, input.author_id).await?;

    if input.total_copies.is_some_and(|n| n < 0) {
        return Err(AppError::BadRequest(
            "total_copies must not be negative".into(),
        ));
    }

    let book = BookRepo::create(&state.pool, &input).await?;
    tracing::info!(book_id = book.id, title = %book.title, "Book created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: book })))
}

/// GET /api/v1/books/{id}
///
/// Get a book with its genres.
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let book = BookRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;
    let genres = BookRepo::genres(&state.pool, id).await?;

    let detail = serde_json::json!({
        "book": book,
        "genres": genres,
    });
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/books/{id}
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBook>,
) -> AppResult<impl IntoResponse> {
    if let Some(author_id) = input.author_id {
        ensure_author_exists(&state.pool, author_id).await?;
    }

    let book = BookRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;
    Ok(Json(DataResponse { data: book }))
}

/// DELETE /api/v1/books/{id}
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !BookRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Book", id }));
    }
    tracing::info!(book_id = id, "Book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/books/{id}/loans
///
/// Loan history for one book, newest first.
pub async fn list_book_loans(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !BookRepo::verify_exists(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Book", id }));
    }
    let loans = LoanRepo::list_by_book(&state.pool, id).await?;
    Ok(Json(DataResponse { data: loans }))
}
