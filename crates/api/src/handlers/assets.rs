//! Handlers for the asset lifecycle.
//!
//! Uploads follow a three-phase protocol: the client requests a
//! credential, uploads directly to the object store, then confirms. Only
//! confirmation — after the store vouches for the object's existence and
//! content type — sets a book's presence flag. Store calls happen outside
//! any database transaction.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use lectern_core::assets::{
    deletion_candidates, storage_key, validate_confirmed_content_type, validate_content_type,
    AssetKind,
};
use lectern_core::error::CoreError;
use lectern_core::types::{DbId, Timestamp};
use lectern_db::models::book::Book;
use lectern_db::repositories::BookRepo;
use lectern_storage::{UploadCredential, READ_URL_TTL_SECS};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load a book or return NotFound.
async fn load_book(pool: &sqlx::PgPool, id: DbId) -> AppResult<Book> {
    BookRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))
}

/// The presence flag for one asset kind.
fn flag_for(book: &Book, kind: AssetKind) -> bool {
    match kind {
        AssetKind::Cover => book.has_cover,
        AssetKind::Model => book.has_model,
        AssetKind::Page => book.has_pages,
    }
}

// ---------------------------------------------------------------------------
// Request upload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub content_type: String,
    /// Required for page assets, ignored otherwise.
    pub page_number: Option<u32>,
}

/// Everything the client needs to perform and later confirm an upload.
#[derive(Debug, Serialize)]
pub struct UploadTicket {
    pub asset_kind: &'static str,
    pub content_type: String,
    pub max_size_bytes: u64,
    pub credential: UploadCredential,
}

/// POST /api/v1/books/{id}/assets/{kind}/upload-url
///
/// Issue a direct-upload credential. Never mutates the book: a credential
/// is not proof the upload will happen.
pub async fn request_upload(
    State(state): State<AppState>,
    Path((id, kind)): Path<(DbId, String)>,
    Json(input): Json<UploadRequest>,
) -> AppResult<impl IntoResponse> {
    let kind = AssetKind::from_name(&kind)?;
    load_book(&state.pool, id).await?;

    validate_content_type(kind, &input.content_type)?;
    let key = storage_key(kind, id, input.page_number)?;

    let credential = state
        .store
        .issue_upload_credential(&key, &input.content_type, kind.max_size_bytes())
        .await?;

    tracing::info!(book_id = id, kind = kind.name(), key = %key, "Upload credential issued");
    Ok(Json(DataResponse {
        data: UploadTicket {
            asset_kind: kind.name(),
            content_type: input.content_type,
            max_size_bytes: kind.max_size_bytes(),
            credential,
        },
    }))
}

// ---------------------------------------------------------------------------
// Confirm upload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub asset_kind: String,
    pub object_key: String,
}

#[derive(Debug, Serialize)]
pub struct AssetConfirmation {
    pub book_id: DbId,
    pub asset_kind: &'static str,
    pub size_bytes: i64,
    pub content_type: String,
    pub last_modified: Option<Timestamp>,
}

/// POST /api/v1/books/{id}/assets/confirm
///
/// Verify the uploaded object really exists in the store with an
/// acceptable content type, then set the presence flag. This is the only
/// path that sets a flag to true; re-confirming a present asset is an
/// idempotent re-set.
pub async fn confirm_upload(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ConfirmRequest>,
) -> AppResult<impl IntoResponse> {
    let kind = AssetKind::from_name(&input.asset_kind)?;
    load_book(&state.pool, id).await?;

    // The credential does not guarantee completion; ask the store.
    if !state.store.exists(&input.object_key).await? {
        return Err(AppError::Core(CoreError::ObjectNotFound {
            key: input.object_key.clone(),
        }));
    }
    // Tolerate the object vanishing between the two calls.
    let metadata = state
        .store
        .metadata(&input.object_key)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::ObjectNotFound {
                key: input.object_key.clone(),
            })
        })?;

    validate_confirmed_content_type(kind, &metadata.content_type)?;

    BookRepo::set_asset_flag(&state.pool, id, kind, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;

    tracing::info!(
        book_id = id,
        kind = kind.name(),
        key = %input.object_key,
        size_bytes = metadata.size_bytes,
        "Asset upload confirmed",
    );
    Ok(Json(DataResponse {
        data: AssetConfirmation {
            book_id: id,
            asset_kind: kind.name(),
            size_bytes: metadata.size_bytes,
            content_type: metadata.content_type,
            last_modified: metadata.last_modified,
        },
    }))
}

// ---------------------------------------------------------------------------
// Read URLs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReadUrlParams {
    /// Page number for page assets (default 1).
    pub page: Option<u32>,
    /// Signed, time-limited URL (default) or plain public URL.
    pub signed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ReadUrl {
    pub url: String,
    pub asset_kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Present only for signed URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<u64>,
}

/// GET /api/v1/books/{id}/assets/{kind}/url
///
/// Return a URL for a present asset, or 404 while the presence flag is
/// unset. Trusts the flag: no per-read existence check against the store.
pub async fn get_read_url(
    State(state): State<AppState>,
    Path((id, kind)): Path<(DbId, String)>,
    Query(params): Query<ReadUrlParams>,
) -> AppResult<impl IntoResponse> {
    let kind = AssetKind::from_name(&kind)?;
    let book = load_book(&state.pool, id).await?;

    if !flag_for(&book, kind) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: kind.label(),
            id,
        }));
    }

    let page = match kind {
        AssetKind::Page => Some(params.page.unwrap_or(1)),
        _ => None,
    };
    let key = storage_key(kind, id, page)?;

    let signed = params.signed.unwrap_or(true);
    let (url, expires_in_secs) = if signed {
        let url = state
            .store
            .issue_read_url(&key, Duration::from_secs(READ_URL_TTL_SECS))
            .await?;
        (url, Some(READ_URL_TTL_SECS))
    } else {
        (state.store.public_url(&key), None)
    };

    Ok(Json(DataResponse {
        data: ReadUrl {
            url,
            asset_kind: kind.name(),
            page_number: page,
            expires_in_secs,
        },
    }))
}

// ---------------------------------------------------------------------------
// Delete assets
// ---------------------------------------------------------------------------

/// Outcome of the best-effort deletion fan-out.
#[derive(Debug, Serialize)]
pub struct AssetDeletionReport {
    pub book_id: DbId,
    /// Keys whose objects were actually removed.
    pub deleted: Vec<String>,
    /// Asset kinds whose presence flags were cleared.
    pub cleared: Vec<&'static str>,
    /// Per-object failures, reported rather than raised.
    pub failures: Vec<String>,
}

/// Fold per-object deletion results into a report.
///
/// A kind is cleared once its deletion was attempted, even if some of its
/// objects failed to delete: the flag means "authoritative asset", not
/// "all bytes gone".
fn summarize_deletions(
    book_id: DbId,
    outcomes: Vec<(AssetKind, String, Result<bool, String>)>,
) -> AssetDeletionReport {
    let mut report = AssetDeletionReport {
        book_id,
        deleted: Vec::new(),
        cleared: Vec::new(),
        failures: Vec::new(),
    };
    for (kind, key, result) in outcomes {
        if !report.cleared.contains(&kind.name()) {
            report.cleared.push(kind.name());
        }
        match result {
            Ok(true) => report.deleted.push(key),
            Ok(false) => {} // probe miss; nothing existed at this key
            Err(err) => report.failures.push(format!("{key}: {err}")),
        }
    }
    report
}

/// DELETE /api/v1/books/{id}/assets
///
/// Best-effort cleanup of every present asset. Page assets probe all
/// candidate page numbers. Individual failures are collected into the
/// report; the call itself only fails on database errors.
pub async fn delete_assets(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let book = load_book(&state.pool, id).await?;

    let candidates =
        deletion_candidates(book.id, book.has_cover, book.has_model, book.has_pages);

    let mut outcomes = Vec::with_capacity(candidates.len());
    for (kind, key) in candidates {
        let result = state
            .store
            .delete(&key)
            .await
            .map_err(|err| err.to_string());
        outcomes.push((kind, key, result));
    }

    let report = summarize_deletions(id, outcomes);

    for cleared in &report.cleared {
        let kind = AssetKind::from_name(cleared)?;
        BookRepo::set_asset_flag(&state.pool, id, kind, false)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;
    }

    tracing::info!(
        book_id = id,
        deleted = report.deleted.len(),
        failures = report.failures.len(),
        "Book assets deleted",
    );

    let status = if report.failures.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(DataResponse { data: report })))
}

// ---------------------------------------------------------------------------
// Direct upload (local backend)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UploadKeyParams {
    pub key: String,
}

/// PUT /api/v1/assets/upload?key=...
///
/// Receives the bytes for upload credentials issued by the local
/// filesystem backend, which has no store to upload to directly.
pub async fn upload_asset(
    State(state): State<AppState>,
    Query(params): Query<UploadKeyParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    if !params.key.starts_with("assets/") {
        return Err(AppError::BadRequest(format!(
            "Invalid upload key '{}'",
            params.key
        )));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    state
        .store
        .put(&params.key, &content_type, body.to_vec())
        .await?;

    tracing::info!(key = %params.key, bytes = body.len(), "Direct upload stored");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::assets::page_key;

    #[test]
    fn summarize_collects_failures_without_blocking_clears() {
        // A cover plus three pages; page 2's deletion fails.
        let outcomes = vec![
            (AssetKind::Cover, "assets/covers/4.jpg".to_string(), Ok(true)),
            (AssetKind::Page, page_key(4, 1), Ok(true)),
            (AssetKind::Page, page_key(4, 2), Err("permission denied".to_string())),
            (AssetKind::Page, page_key(4, 3), Ok(true)),
            (AssetKind::Page, page_key(4, 4), Ok(false)),
        ];

        let report = summarize_deletions(4, outcomes);

        assert_eq!(report.deleted.len(), 3);
        // Both kinds cleared despite the failed page.
        assert_eq!(report.cleared, vec!["cover", "page"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("assets/pages/4/2.jpg"));
        assert!(report.failures[0].contains("permission denied"));
    }

    #[test]
    fn summarize_empty_book() {
        let report = summarize_deletions(9, Vec::new());
        assert!(report.deleted.is_empty());
        assert!(report.cleared.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn probe_misses_are_not_failures() {
        let outcomes = vec![
            (AssetKind::Page, page_key(1, 1), Ok(true)),
            (AssetKind::Page, page_key(1, 2), Ok(false)),
            (AssetKind::Page, page_key(1, 3), Ok(false)),
        ];
        let report = summarize_deletions(1, outcomes);
        assert_eq!(report.deleted, vec![page_key(1, 1)]);
        assert_eq!(report.cleared, vec!["page"]);
        assert!(report.failures.is_empty());
    }
}
