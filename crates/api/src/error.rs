use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use lectern_core::error::CoreError;
use lectern_storage::StorageError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `lectern-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An object-store error from `lectern-storage`.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Unavailable { .. } => {
                    (StatusCode::NOT_FOUND, "UNAVAILABLE", core.to_string())
                }
                CoreError::InvalidContentType { .. } => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_CONTENT_TYPE",
                    core.to_string(),
                ),
                CoreError::InvalidPageNumber { .. } => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_PAGE_NUMBER",
                    core.to_string(),
                ),
                CoreError::ContentTypeMismatch { .. } => (
                    StatusCode::BAD_REQUEST,
                    "CONTENT_TYPE_MISMATCH",
                    core.to_string(),
                ),
                CoreError::ObjectNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "OBJECT_NOT_FOUND", core.to_string())
                }
                CoreError::StorageFault(msg) => {
                    tracing::error!(error = %msg, "Storage fault");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_FAULT",
                        "A storage error occurred".to_string(),
                    )
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Object-store errors ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Object store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_FAULT",
                    "A storage error occurred".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`)
///   map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn unavailable_maps_to_404() {
        let err = AppError::Core(CoreError::Unavailable { book_id: 1 });
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn caller_input_errors_map_to_400() {
        let invalid_ct = AppError::Core(CoreError::InvalidContentType {
            kind: "cover",
            content_type: "text/plain".into(),
        });
        assert_eq!(status_of(invalid_ct), StatusCode::BAD_REQUEST);

        let invalid_page = AppError::Core(CoreError::InvalidPageNumber { page: 101, max: 100 });
        assert_eq!(status_of(invalid_page), StatusCode::BAD_REQUEST);

        let mismatch = AppError::Core(CoreError::ContentTypeMismatch {
            kind: "model",
            content_type: "image/png".into(),
        });
        assert_eq!(status_of(mismatch), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_things_map_to_404() {
        let not_found = AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: 9,
        });
        assert_eq!(status_of(not_found), StatusCode::NOT_FOUND);

        let object = AppError::Core(CoreError::ObjectNotFound {
            key: "assets/covers/9.jpg".into(),
        });
        assert_eq!(status_of(object), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_faults_map_to_500() {
        let fault = AppError::Core(CoreError::StorageFault("s3 unreachable".into()));
        assert_eq!(status_of(fault), StatusCode::INTERNAL_SERVER_ERROR);

        let storage = AppError::Storage(StorageError::Backend("timeout".into()));
        assert_eq!(status_of(storage), StatusCode::INTERNAL_SERVER_ERROR);

        let db = AppError::Database(sqlx::Error::PoolClosed);
        assert_eq!(status_of(db), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
