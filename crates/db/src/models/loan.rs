//! Loan entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectern_core::types::{DbId, Timestamp};

/// A loan row from the `loans` table.
///
/// A loan is open while `returned_at` is null and closes exactly once;
/// `returned_at` is immutable after it is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Loan {
    pub id: DbId,
    pub book_id: DbId,
    pub borrower: String,
    pub borrowed_at: Timestamp,
    pub due_at: Timestamp,
    pub returned_at: Option<Timestamp>,
}

impl Loan {
    /// Whether the loan is still open.
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// DTO for a borrow request.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowRequest {
    pub book_id: DbId,
    pub borrower: String,
    /// Loan duration in days. Defaults to
    /// [`lectern_core::circulation::DEFAULT_LOAN_DAYS`].
    pub days: Option<i64>,
}

/// Result of a borrow attempt.
///
/// Distinguishes the business outcomes from infrastructure errors, which
/// surface separately as `sqlx::Error`.
#[derive(Debug)]
pub enum BorrowOutcome {
    /// A copy was reserved and the loan created.
    Created(Loan),
    /// No copies were available.
    Unavailable,
    /// The book does not exist.
    BookNotFound,
}
