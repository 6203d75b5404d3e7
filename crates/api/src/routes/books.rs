//! Route definitions for books and their assets, mounted at `/books`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{assets, books};
use crate::state::AppState;

/// ```text
/// GET    /                             -> list_books
/// POST   /                             -> create_book
/// GET    /{id}                         -> get_book
/// PUT    /{id}                         -> update_book
/// DELETE /{id}                         -> delete_book
/// GET    /{id}/loans                   -> list_book_loans
/// DELETE /{id}/assets                  -> delete_assets
/// POST   /{id}/assets/confirm          -> confirm_upload
/// POST   /{id}/assets/{kind}/upload-url -> request_upload
/// GET    /{id}/assets/{kind}/url       -> get_read_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route(
            "/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/{id}/loans", get(books::list_book_loans))
        .route("/{id}/assets", delete(assets::delete_assets))
        .route("/{id}/assets/confirm", post(assets::confirm_upload))
        .route("/{id}/assets/{kind}/upload-url", post(assets::request_upload))
        .route("/{id}/assets/{kind}/url", get(assets::get_read_url))
}
