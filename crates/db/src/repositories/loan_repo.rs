//! Repository for loans: the circulation state transitions.
//!
//! `borrow` is the only compound check-and-mutate in the system and runs
//! as a single transaction holding a row lock on the book. `return_loan`
//! closes the loan with a guarded single-statement update and then gives
//! the copy back with an atomic increment; it takes no lock.

use sqlx::PgPool;

use lectern_core::types::{DbId, Timestamp};

use crate::models::loan::{BorrowOutcome, Loan};
use crate::repositories::BookRepo;

/// Column list for `loans` queries.
const COLUMNS: &str = "id, book_id, borrower, borrowed_at, due_at, returned_at";

/// Provides circulation operations and loan lookups.
pub struct LoanRepo;

impl LoanRepo {
    // -----------------------------------------------------------------------
    // Circulation
    // -----------------------------------------------------------------------

    /// Borrow one copy of a book.
    ///
    /// Locks the book row (`SELECT ... FOR UPDATE`), re-reads the
    /// availability under the lock, decrements, and creates the loan, all
    /// in one transaction. Concurrent borrows of the same book serialize
    /// on the row lock; no interleaving can observe the decrement without
    /// the loan or vice versa.
    pub async fn borrow(
        pool: &PgPool,
        book_id: DbId,
        borrower: &str,
        due_at: Timestamp,
    ) -> Result<BorrowOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(i32,)> =
            sqlx::query_as("SELECT available_copies FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((available,)) = row else {
            return Ok(BorrowOutcome::BookNotFound);
        };
        if available < 1 {
            return Ok(BorrowOutcome::Unavailable);
        }

        sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO loans (book_id, borrower, due_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let loan = sqlx::query_as::<_, Loan>(&query)
            .bind(book_id)
            .bind(borrower)
            .bind(due_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(loan_id = loan.id, book_id, "Borrowed one copy");
        Ok(BorrowOutcome::Created(loan))
    }

    /// Return a loan. Idempotent: an already-closed loan is returned
    /// unchanged and the book's count is not touched again.
    ///
    /// The `returned_at IS NULL` guard makes the close a
    /// compare-and-set, so exactly one caller wins a concurrent
    /// double-return and the increment runs at most once per loan.
    pub async fn return_loan(pool: &PgPool, id: DbId) -> Result<Option<Loan>, sqlx::Error> {
        let query = format!(
            "UPDATE loans SET returned_at = NOW() \
             WHERE id = $1 AND returned_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let closed = sqlx::query_as::<_, Loan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match closed {
            Some(loan) => {
                BookRepo::increment_available(pool, loan.book_id).await?;
                tracing::debug!(loan_id = loan.id, book_id = loan.book_id, "Loan returned");
                Ok(Some(loan))
            }
            // Already closed, or no such loan; hand back whatever exists.
            None => Self::find_by_id(pool, id).await,
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Find a loan by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Loan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM loans WHERE id = $1");
        sqlx::query_as::<_, Loan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all loans, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Loan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM loans ORDER BY borrowed_at DESC");
        sqlx::query_as::<_, Loan>(&query).fetch_all(pool).await
    }

    /// List open (unreturned) loans, oldest due first.
    pub async fn list_open(pool: &PgPool) -> Result<Vec<Loan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM loans WHERE returned_at IS NULL ORDER BY due_at ASC"
        );
        sqlx::query_as::<_, Loan>(&query).fetch_all(pool).await
    }

    /// Loan history for one book, newest first.
    pub async fn list_by_book(pool: &PgPool, book_id: DbId) -> Result<Vec<Loan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM loans WHERE book_id = $1 ORDER BY borrowed_at DESC"
        );
        sqlx::query_as::<_, Loan>(&query)
            .bind(book_id)
            .fetch_all(pool)
            .await
    }
}
