//! Error types for the storage layer.

use bookshelf_core::{AuthorId, Isbn, TagId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error not covered by a more specific variant.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Book not found.
    #[error("There is no book with an isbn '{0}'")]
    BookNotFound(Isbn),

    /// Author not found.
    #[error("There is no author with an id '{0}'")]
    AuthorNotFound(AuthorId),

    /// Tag not found.
    #[error("There is no tag with an id '{0}'")]
    TagNotFound(TagId),

    /// A book with this isbn already exists.
    #[error("duplicate book: a book with isbn '{0}' already exists")]
    DuplicateBook(Isbn),

    /// Another tag already has this name.
    #[error("duplicate tag: a tag named '{0}' already exists")]
    DuplicateTag(String),

    /// A book referenced an author that does not exist.
    #[error("unknown author: no author with id '{0}'")]
    UnknownAuthor(AuthorId),

    /// The author still owns books and cannot be deleted.
    #[error("author {0} still has books; detach them first")]
    AuthorHasBooks(AuthorId),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True when the requested key does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BookNotFound(_) | Self::AuthorNotFound(_) | Self::TagNotFound(_)
        )
    }
}

/// True when the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// True when the error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Name of the constraint a database error violated, if any.
pub(crate) fn violated_constraint(error: &sqlx::Error) -> Option<&str> {
    match error {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

/// Maps constraint violations raised by an insert or update on `books`.
pub(crate) fn book_write_error(
    isbn: &Isbn,
    author_id: Option<AuthorId>,
    error: sqlx::Error,
) -> StoreError {
    if is_unique_violation(&error) {
        return StoreError::DuplicateBook(isbn.clone());
    }
    if let Some(author_id) = author_id
        && is_foreign_key_violation(&error)
    {
        return StoreError::UnknownAuthor(author_id);
    }
    StoreError::Database(error)
}
