//! Request handlers.
//!
//! Each submodule provides async handler functions for one entity or
//! subsystem. Handlers delegate to the repositories in `lectern-db` and
//! the [`lectern_storage::ObjectStore`], and map errors via
//! [`crate::error::AppError`].

pub mod assets;
pub mod authors;
pub mod books;
pub mod genres;
pub mod loans;
