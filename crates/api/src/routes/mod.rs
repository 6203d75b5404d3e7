pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod loans;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /authors                                 list, create
/// /authors/{id}                            get, update, delete
///
/// /genres                                  list, create
/// /genres/{id}                             get, update, delete
///
/// /books                                   list, create
/// /books/{id}                              get, update, delete
/// /books/{id}/loans                        loan history
/// /books/{id}/assets                       delete all assets (DELETE)
/// /books/{id}/assets/confirm               confirm an upload (POST)
/// /books/{id}/assets/{kind}/upload-url     issue upload credential (POST)
/// /books/{id}/assets/{kind}/url            read URL, ?page=&signed= (GET)
///
/// /loans                                   list, borrow (POST)
/// /loans/open                              open loans
/// /loans/{id}                              get
/// /loans/{id}/return                       return a loan (POST)
///
/// /assets/upload                           direct upload, local backend (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/authors", authors::router())
        .nest("/genres", genres::router())
        .nest("/books", books::router())
        .nest("/loans", loans::router())
        .merge(uploads::router())
}
