//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for
//! sqlx queries. They are separate from the domain types in
//! bookshelf-core so that the core crate stays free of sqlx.

use bookshelf_core::{Author, AuthorId, Book, Isbn, Tag, TagId};
use sqlx::FromRow;

/// Database row for the `authors` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AuthorRow {
    pub id: i32,
    pub name: String,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author::with_id(AuthorId(row.id), row.name)
    }
}

/// Database row for the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookRow {
    pub isbn: String,
    pub amazon_url: String,
    pub author_id: Option<i32>,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            isbn: Isbn(row.isbn),
            amazon_url: row.amazon_url,
            author_id: row.author_id.map(AuthorId),
            language: row.language,
            pages: row.pages,
            publisher: row.publisher,
            title: row.title,
            year: row.year,
        }
    }
}

/// Database row for the `tags` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TagRow {
    pub id: i32,
    pub name: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag::with_id(TagId(row.id), row.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_row_without_author() {
        let row = BookRow {
            isbn: "1234567890".to_string(),
            amazon_url: "http://a.co/d9PzSbz".to_string(),
            author_id: None,
            language: "english".to_string(),
            pages: 279,
            publisher: "Vintage Classics".to_string(),
            title: "Pride and Prejudice".to_string(),
            year: 1813,
        };
        let book = Book::from(row);
        assert_eq!(book.isbn, Isbn::from("1234567890"));
        assert_eq!(book.author_id, None);
    }

    #[test]
    fn test_rows_carry_ids() {
        let author = Author::from(AuthorRow {
            id: 2,
            name: "George Orwell".to_string(),
        });
        assert_eq!(author.id, Some(AuthorId(2)));

        let tag = Tag::from(TagRow {
            id: 5,
            name: "fiction".to_string(),
        });
        assert_eq!(tag.id, Some(TagId(5)));
    }
}
