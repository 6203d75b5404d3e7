//! Route definitions for circulation, mounted at `/loans`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::loans;
use crate::state::AppState;

/// ```text
/// GET  /             -> list_loans
/// POST /             -> borrow
/// GET  /open         -> list_open_loans
/// GET  /{id}         -> get_loan
/// POST /{id}/return  -> return_loan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(loans::list_loans).post(loans::borrow))
        .route("/open", get(loans::list_open_loans))
        .route("/{id}", get(loans::get_loan))
        .route("/{id}/return", post(loans::return_loan))
}
