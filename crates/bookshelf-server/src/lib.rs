//! bookshelf-server: HTTP API for the Bookshelf catalog
//!
//! This crate provides:
//! - REST endpoints for books, authors and tags
//! - Request body validation against declarative schemas
//! - JSON error responses
//!
//! # Architecture
//!
//! The server is built on Axum. Handlers are thin: they validate the body,
//! call one or two store mappers and wrap the result in a JSON envelope.
//! The binary adds tracing, CORS and request-id layers around the router.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use bookshelf_core;
pub use bookshelf_store;
