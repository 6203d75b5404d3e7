//! Book entity model and DTOs.
//!
//! `available_copies` is written only by the circulation operations in
//! [`crate::repositories::LoanRepo`] and
//! [`crate::repositories::BookRepo::increment_available`]; the asset
//! presence flags only by the asset confirm/delete paths.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectern_core::types::{DbId, Timestamp};

/// A book row from the `books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub author_id: DbId,
    /// A confirmed cover image exists in the object store (believed; the
    /// flag and the bytes are not transactionally linked).
    pub has_cover: bool,
    pub has_model: bool,
    pub has_pages: bool,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Book with its author's name resolved, for list results.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookWithAuthor {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub author_id: DbId,
    pub has_cover: bool,
    pub has_model: bool,
    pub has_pages: bool,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Resolved author name (from JOIN).
    pub author_name: String,
}

/// DTO for creating a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub description: Option<String>,
    pub author_id: DbId,
    /// Initial stock; `available_copies` starts equal to this.
    /// Defaults to 1.
    pub total_copies: Option<i32>,
    pub genre_ids: Option<Vec<DbId>>,
}

/// DTO for updating an existing book's catalog fields.
///
/// Copy counts are deliberately absent: they change only through the
/// circulation operations.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<DbId>,
    pub genre_ids: Option<Vec<DbId>>,
}
