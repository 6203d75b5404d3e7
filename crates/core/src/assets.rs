//! Asset-kind rules and storage-key derivation.
//!
//! Each book can carry three kinds of asset: a cover image, a 3D model,
//! and numbered page textures. This module owns the per-kind content-type
//! allow-lists, size limits, the deterministic mapping from
//! `(book_id, kind, page)` to an object-store key, and the confirm-time
//! content-type checks. Nothing here touches the store or the database.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Highest page number a book may have. The deletion path probes every
/// candidate page key up to this bound rather than tracking a page count.
pub const MAX_PAGE_NUMBER: u32 = 100;

/// Maximum cover image size (10 MiB).
pub const COVER_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum 3D model size (100 MiB).
pub const MODEL_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// Maximum page texture size (5 MiB).
pub const PAGE_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Content types accepted for cover images and page textures.
const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Content types accepted for 3D models (glTF binary, or raw octet-stream
/// for exporters that do not set a model MIME type).
const MODEL_CONTENT_TYPES: &[&str] = &["model/gltf-binary", "application/octet-stream"];

const COVER_PREFIX: &str = "assets/covers/";
const MODEL_PREFIX: &str = "assets/models/";
const PAGE_PREFIX: &str = "assets/pages/";

// ---------------------------------------------------------------------------
// Asset kind
// ---------------------------------------------------------------------------

/// The three kinds of book asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Cover,
    Model,
    Page,
}

impl AssetKind {
    /// Parse from the wire name. Accepts `pages` as an alias for `page`
    /// since the presence flag covers the whole page set.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "cover" => Ok(Self::Cover),
            "model" => Ok(Self::Model),
            "page" | "pages" => Ok(Self::Page),
            other => Err(CoreError::Validation(format!(
                "Unknown asset kind '{other}'. Must be one of: cover, model, page"
            ))),
        }
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Model => "model",
            Self::Page => "page",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cover => "cover image",
            Self::Model => "3D model",
            Self::Page => "page texture",
        }
    }

    /// Content types accepted at upload-credential time.
    pub fn allowed_content_types(self) -> &'static [&'static str] {
        match self {
            Self::Cover | Self::Page => IMAGE_CONTENT_TYPES,
            Self::Model => MODEL_CONTENT_TYPES,
        }
    }

    /// Maximum upload size in bytes.
    pub fn max_size_bytes(self) -> u64 {
        match self {
            Self::Cover => COVER_MAX_BYTES,
            Self::Model => MODEL_MAX_BYTES,
            Self::Page => PAGE_MAX_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a declared content type against the kind's allow-list.
pub fn validate_content_type(kind: AssetKind, content_type: &str) -> Result<(), CoreError> {
    if kind.allowed_content_types().contains(&content_type) {
        Ok(())
    } else {
        Err(CoreError::InvalidContentType {
            kind: kind.name(),
            content_type: content_type.to_string(),
        })
    }
}

/// Validate a page number is in `1..=MAX_PAGE_NUMBER`.
pub fn validate_page_number(page: u32) -> Result<(), CoreError> {
    if (1..=MAX_PAGE_NUMBER).contains(&page) {
        Ok(())
    } else {
        Err(CoreError::InvalidPageNumber {
            page,
            max: MAX_PAGE_NUMBER,
        })
    }
}

/// Validate the content type the store reports at confirmation time.
///
/// Looser than the upload allow-list: images only need the `image/`
/// prefix, since stores may normalize or append charset parameters.
/// Models must be exactly one of the allowed model types.
pub fn validate_confirmed_content_type(
    kind: AssetKind,
    content_type: &str,
) -> Result<(), CoreError> {
    let ok = match kind {
        AssetKind::Cover | AssetKind::Page => content_type.starts_with("image/"),
        AssetKind::Model => MODEL_CONTENT_TYPES.contains(&content_type),
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::ContentTypeMismatch {
            kind: kind.name(),
            content_type: content_type.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Object-store key for a book's cover image.
pub fn cover_key(book_id: DbId) -> String {
    format!("{COVER_PREFIX}{book_id}.jpg")
}

/// Object-store key for a book's 3D model.
pub fn model_key(book_id: DbId) -> String {
    format!("{MODEL_PREFIX}{book_id}.glb")
}

/// Object-store key for one page texture of a book.
pub fn page_key(book_id: DbId, page: u32) -> String {
    format!("{PAGE_PREFIX}{book_id}/{page}.jpg")
}

/// Derive the storage key for `(kind, book_id, page)`.
///
/// `page` is required (and range-checked) for page assets and ignored for
/// the other kinds.
pub fn storage_key(kind: AssetKind, book_id: DbId, page: Option<u32>) -> Result<String, CoreError> {
    match kind {
        AssetKind::Cover => Ok(cover_key(book_id)),
        AssetKind::Model => Ok(model_key(book_id)),
        AssetKind::Page => {
            let page = page.ok_or_else(|| {
                CoreError::Validation("page_number is required for page assets".into())
            })?;
            validate_page_number(page)?;
            Ok(page_key(book_id, page))
        }
    }
}

// ---------------------------------------------------------------------------
// Deletion planning
// ---------------------------------------------------------------------------

/// Enumerate the candidate object keys to delete for a book, given its
/// presence flags. Page assets probe every page number up to
/// [`MAX_PAGE_NUMBER`]; most probes will miss, which the best-effort
/// deletion path tolerates.
pub fn deletion_candidates(
    book_id: DbId,
    has_cover: bool,
    has_model: bool,
    has_pages: bool,
) -> Vec<(AssetKind, String)> {
    let mut candidates = Vec::new();
    if has_cover {
        candidates.push((AssetKind::Cover, cover_key(book_id)));
    }
    if has_model {
        candidates.push((AssetKind::Model, model_key(book_id)));
    }
    if has_pages {
        for page in 1..=MAX_PAGE_NUMBER {
            candidates.push((AssetKind::Page, page_key(book_id, page)));
        }
    }
    candidates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn kind_from_name() {
        assert_eq!(AssetKind::from_name("cover").unwrap(), AssetKind::Cover);
        assert_eq!(AssetKind::from_name("model").unwrap(), AssetKind::Model);
        assert_eq!(AssetKind::from_name("page").unwrap(), AssetKind::Page);
        assert_eq!(AssetKind::from_name("pages").unwrap(), AssetKind::Page);
        assert!(AssetKind::from_name("audio").is_err());
        assert!(AssetKind::from_name("").is_err());
    }

    #[test]
    fn cover_allows_only_images() {
        assert!(validate_content_type(AssetKind::Cover, "image/jpeg").is_ok());
        assert!(validate_content_type(AssetKind::Cover, "image/png").is_ok());
        assert!(validate_content_type(AssetKind::Cover, "image/webp").is_ok());
        assert_matches!(
            validate_content_type(AssetKind::Cover, "text/plain"),
            Err(CoreError::InvalidContentType { kind: "cover", .. })
        );
    }

    #[test]
    fn model_allows_gltf_and_octet_stream() {
        assert!(validate_content_type(AssetKind::Model, "model/gltf-binary").is_ok());
        assert!(validate_content_type(AssetKind::Model, "application/octet-stream").is_ok());
        assert_matches!(
            validate_content_type(AssetKind::Model, "image/png"),
            Err(CoreError::InvalidContentType { kind: "model", .. })
        );
    }

    #[test]
    fn page_shares_cover_allow_list() {
        assert_eq!(
            AssetKind::Page.allowed_content_types(),
            AssetKind::Cover.allowed_content_types()
        );
    }

    #[test]
    fn size_limits() {
        assert_eq!(AssetKind::Cover.max_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(AssetKind::Model.max_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(AssetKind::Page.max_size_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn page_number_bounds() {
        assert!(validate_page_number(1).is_ok());
        assert!(validate_page_number(100).is_ok());
        assert_matches!(
            validate_page_number(0),
            Err(CoreError::InvalidPageNumber { page: 0, max: 100 })
        );
        assert_matches!(
            validate_page_number(101),
            Err(CoreError::InvalidPageNumber { page: 101, .. })
        );
    }

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(cover_key(7), "assets/covers/7.jpg");
        assert_eq!(model_key(7), "assets/models/7.glb");
        assert_eq!(page_key(7, 12), "assets/pages/7/12.jpg");
    }

    #[test]
    fn storage_key_requires_page_for_page_kind() {
        assert_eq!(
            storage_key(AssetKind::Cover, 3, None).unwrap(),
            "assets/covers/3.jpg"
        );
        assert_eq!(
            storage_key(AssetKind::Page, 3, Some(4)).unwrap(),
            "assets/pages/3/4.jpg"
        );
        assert_matches!(
            storage_key(AssetKind::Page, 3, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            storage_key(AssetKind::Page, 3, Some(101)),
            Err(CoreError::InvalidPageNumber { .. })
        );
    }

    #[test]
    fn confirm_accepts_image_family_for_cover() {
        assert!(validate_confirmed_content_type(AssetKind::Cover, "image/avif").is_ok());
        assert!(validate_confirmed_content_type(AssetKind::Page, "image/jpeg").is_ok());
        assert_matches!(
            validate_confirmed_content_type(AssetKind::Cover, "application/pdf"),
            Err(CoreError::ContentTypeMismatch { kind: "cover", .. })
        );
    }

    #[test]
    fn confirm_is_strict_for_models() {
        assert!(validate_confirmed_content_type(AssetKind::Model, "model/gltf-binary").is_ok());
        assert!(
            validate_confirmed_content_type(AssetKind::Model, "application/octet-stream").is_ok()
        );
        assert_matches!(
            validate_confirmed_content_type(AssetKind::Model, "model/obj"),
            Err(CoreError::ContentTypeMismatch { kind: "model", .. })
        );
    }

    #[test]
    fn deletion_candidates_cover_and_model_only() {
        let candidates = deletion_candidates(5, true, true, false);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], (AssetKind::Cover, cover_key(5)));
        assert_eq!(candidates[1], (AssetKind::Model, model_key(5)));
    }

    #[test]
    fn deletion_candidates_probe_all_pages() {
        let candidates = deletion_candidates(5, false, false, true);
        assert_eq!(candidates.len(), MAX_PAGE_NUMBER as usize);
        assert_eq!(candidates[0].1, "assets/pages/5/1.jpg");
        assert_eq!(candidates[99].1, "assets/pages/5/100.jpg");
    }

    #[test]
    fn deletion_candidates_empty_when_nothing_present() {
        assert!(deletion_candidates(5, false, false, false).is_empty());
    }
}
