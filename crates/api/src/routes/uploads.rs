//! Direct-upload route for the local filesystem backend.

use axum::extract::DefaultBodyLimit;
use axum::routing::put;
use axum::Router;

use lectern_core::assets::MODEL_MAX_BYTES;

use crate::handlers::assets;
use crate::state::AppState;

/// ```text
/// PUT /assets/upload?key=... -> upload_asset
/// ```
///
/// The body limit covers the largest allowed asset (the 3D model).
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/assets/upload",
        put(assets::upload_asset).layer(DefaultBodyLimit::max(MODEL_MAX_BYTES as usize)),
    )
}
