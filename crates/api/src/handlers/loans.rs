//! Handlers for circulation: borrowing and returning copies.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use chrono::Utc;

use lectern_core::circulation::{due_date, validate_loan_days, DEFAULT_LOAN_DAYS};
use lectern_core::error::CoreError;
use lectern_core::types::DbId;
use lectern_db::models::loan::{BorrowOutcome, BorrowRequest};
use lectern_db::repositories::LoanRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/loans
///
/// Borrow one copy of a book. The availability check, decrement, and loan
/// creation happen atomically in the repository; two racing borrows of
/// the last copy resolve to one loan and one `Unavailable`.
pub async fn borrow(
    State(state): State<AppState>,
    Json(input): Json<BorrowRequest>,
) -> AppResult<impl IntoResponse> {
    if input.borrower.trim().is_empty() {
        return Err(AppError::BadRequest("borrower must not be empty".into()));
    }
    let days = input.days.unwrap_or(DEFAULT_LOAN_DAYS);
    validate_loan_days(days)?;

    let due = due_date(Utc::now(), days);
    let outcome = LoanRepo::borrow(&state.pool, input.book_id, &input.borrower, due).await?;

    let loan = match outcome {
        BorrowOutcome::Created(loan) => loan,
        BorrowOutcome::Unavailable => {
            return Err(AppError::Core(CoreError::Unavailable {
                book_id: input.book_id,
            }));
        }
        BorrowOutcome::BookNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Book",
                id: input.book_id,
            }));
        }
    };

    tracing::info!(
        loan_id = loan.id,
        book_id = loan.book_id,
        borrower = %loan.borrower,
        "Loan created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: loan })))
}

/// POST /api/v1/loans/{id}/return
///
/// Return a loan. Idempotent: returning an already-closed loan responds
/// with the existing record unchanged.
pub async fn return_loan(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let loan = LoanRepo::return_loan(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Loan", id }))?;
    Ok(Json(DataResponse { data: loan }))
}

/// GET /api/v1/loans
pub async fn list_loans(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let loans = LoanRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: loans }))
}

/// GET /api/v1/loans/open
pub async fn list_open_loans(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let loans = LoanRepo::list_open(&state.pool).await?;
    Ok(Json(DataResponse { data: loans }))
}

/// GET /api/v1/loans/{id}
pub async fn get_loan(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let loan = LoanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Loan", id }))?;
    Ok(Json(DataResponse { data: loan }))
}
