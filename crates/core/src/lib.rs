//! Pure domain logic for the lectern library backend.
//!
//! No I/O lives here: asset-kind rules and storage-key derivation,
//! circulation timing rules, and the shared error taxonomy. The `db`,
//! `storage`, and `api` crates build on these.

pub mod assets;
pub mod circulation;
pub mod error;
pub mod types;
