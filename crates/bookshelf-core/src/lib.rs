//! bookshelf-core: Core types for the Bookshelf catalog
//!
//! This crate provides:
//! - Identifier newtypes for authors, tags and books
//! - Entity types (`Author`, `Book`, `Tag`) shared by the store and the API
//! - Full (`BookUpdate`) and partial (`BookPatch`) book update payloads
//! - Request-body schema validation (`Schema`, `Validator`)
//!
//! Nothing in this crate performs I/O.

pub mod schema;
pub mod types;

pub use schema::{
    AUTHOR_SCHEMA, BOOK_PATCH_SCHEMA, BOOK_SCHEMA, BOOK_UPDATE_SCHEMA, FieldType, Property,
    Schema, SchemaValidator, ValidationError, ValidationReport, Validator,
};
pub use types::*;
