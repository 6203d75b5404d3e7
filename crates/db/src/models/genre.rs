//! Genre entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectern_core::types::{DbId, Timestamp};

/// A genre row from the `genres` table. Names are unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Genre {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new genre.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenre {
    pub name: String,
}

/// DTO for updating an existing genre.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGenre {
    pub name: Option<String>,
}
