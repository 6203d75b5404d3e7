//! Repository for the book catalog.
//!
//! Catalog CRUD plus the two non-circulation writers the asset lifecycle
//! needs: presence-flag updates and the atomic availability increment
//! used by loan returns.

use sqlx::PgPool;

use lectern_core::assets::AssetKind;
use lectern_core::types::DbId;

use crate::models::book::{Book, BookWithAuthor, CreateBook, UpdateBook};
use crate::models::genre::Genre;

/// Column list for `books` queries.
const COLUMNS: &str = "\
    id, title, description, author_id, \
    has_cover, has_model, has_pages, \
    total_copies, available_copies, \
    created_at, updated_at";

/// Map an asset kind to its presence-flag column.
fn flag_column(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Cover => "has_cover",
        AssetKind::Model => "has_model",
        AssetKind::Page => "has_pages",
    }
}

/// Provides CRUD and flag operations for books.
pub struct BookRepo;

impl BookRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Create a book (and its genre links) in one transaction.
    /// `available_copies` starts equal to `total_copies`.
    pub async fn create(pool: &PgPool, input: &CreateBook) -> Result<Book, sqlx::Error> {
        let total_copies = input.total_copies.unwrap_or(1);

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO books (title, description, author_id, total_copies, available_copies) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.author_id)
            .bind(total_copies)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(genre_ids) = &input.genre_ids {
            for genre_id in genre_ids {
                sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                    .bind(book.id)
                    .bind(genre_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Find a book by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all books, newest first, with author names resolved.
    pub async fn list(pool: &PgPool) -> Result<Vec<BookWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, BookWithAuthor>(
            "SELECT \
                b.id, b.title, b.description, b.author_id, \
                b.has_cover, b.has_model, b.has_pages, \
                b.total_copies, b.available_copies, \
                b.created_at, b.updated_at, \
                a.name AS author_name \
             FROM books b \
             JOIN authors a ON a.id = b.author_id \
             ORDER BY b.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a book's catalog fields. Returns the updated row, or `None`
    /// if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBook,
    ) -> Result<Option<Book>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE books SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                author_id = COALESCE($4, author_id), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.description.as_deref())
            .bind(input.author_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(book) = book else {
            return Ok(None);
        };

        if let Some(genre_ids) = &input.genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for genre_id in genre_ids {
                sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(genre_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(book))
    }

    /// Delete a book by ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Verify that a book exists by ID.
    pub async fn verify_exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(count.0 > 0)
    }

    /// Genres linked to a book.
    pub async fn genres(pool: &PgPool, book_id: DbId) -> Result<Vec<Genre>, sqlx::Error> {
        sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name, g.created_at, g.updated_at \
             FROM genres g \
             JOIN book_genres bg ON bg.genre_id = g.id \
             WHERE bg.book_id = $1 \
             ORDER BY g.name",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Asset presence flags
    // -----------------------------------------------------------------------

    /// Set or clear one asset presence flag. Returns the updated row, or
    /// `None` if the book does not exist.
    pub async fn set_asset_flag(
        pool: &PgPool,
        id: DbId,
        kind: AssetKind,
        present: bool,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET {flag} = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}",
            flag = flag_column(kind),
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(present)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Circulation support
    // -----------------------------------------------------------------------

    /// Atomically give a copy back.
    ///
    /// Single-statement atomic add, so it never races a concurrent
    /// borrow's read-modify-write; `LEAST` keeps the count inside the
    /// schema's `available <= total` check even if a stray extra return
    /// slips past the loan-side idempotency.
    pub async fn increment_available(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE books SET \
                available_copies = LEAST(available_copies + 1, total_copies), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
