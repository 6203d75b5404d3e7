//! Author entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectern_core::types::{DbId, Timestamp};

/// An author row from the `authors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Author {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new author.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthor {
    pub name: String,
}

/// DTO for updating an existing author.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAuthor {
    pub name: Option<String>,
}
