//! bookshelf-store: Storage layer for the Bookshelf catalog
//!
//! This crate provides:
//! - PostgreSQL storage for authors, books, tags and book-tag links
//! - One mapper per table (`Authors`, `Books`, `Tags`) owning its queries
//! - Migration management
//! - Type-safe database operations via sqlx
//!
//! # Consistency
//!
//! Every mapper call is a single statement, so it either fully applies or
//! not at all. The only composite operation, tagging a book with a tag
//! that may not exist yet, runs in one transaction. Referential integrity
//! and uniqueness are enforced by the schema's constraints, and constraint
//! violations are reported as typed `StoreError` variants.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookshelf_store::{Store, StoreConfig};
//! use bookshelf_core::{Isbn, Tag};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let mut tag = Tag::new("fiction");
//! store.books().add_tag(&Isbn::from("0691161518"), &mut tag).await?;
//! let tags = store.books().tags(&Isbn::from("0691161518")).await?;
//! ```

pub mod authors;
pub mod books;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;
pub mod tags;

#[cfg(all(test, feature = "integration-tests"))]
pub(crate) mod test_support;

pub use authors::Authors;
pub use books::Books;
pub use error::{StoreError, StoreResult};
pub use models::{AuthorRow, BookRow, TagRow};
pub use store::{Store, StoreConfig};
pub use tags::Tags;

// Re-export bookshelf-core for downstream crates
pub use bookshelf_core;
