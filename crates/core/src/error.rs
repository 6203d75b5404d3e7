use crate::types::DbId;

/// Domain error taxonomy shared by every lectern crate.
///
/// Business-rule and input errors carry enough context for the HTTP layer
/// to render a caller-facing message; `StorageFault` and `Internal` are
/// infrastructure faults that the boundary logs and sanitizes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("No copies of book {book_id} are available")]
    Unavailable { book_id: DbId },

    #[error("Content type '{content_type}' is not allowed for {kind} uploads")]
    InvalidContentType {
        kind: &'static str,
        content_type: String,
    },

    #[error("Page number {page} is out of range (must be 1-{max})")]
    InvalidPageNumber { page: u32, max: u32 },

    #[error("Stored object has content type '{content_type}', which does not match {kind}")]
    ContentTypeMismatch {
        kind: &'static str,
        content_type: String,
    },

    #[error("Object '{key}' not found in storage")]
    ObjectNotFound { key: String },

    #[error("Storage fault: {0}")]
    StorageFault(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
