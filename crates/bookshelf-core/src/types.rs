//! Core data types for the Bookshelf catalog.
//!
//! The catalog has three entities:
//!
//! - `Author`: a named person owning zero or more books
//! - `Book`: keyed by its ISBN, optionally attributed to an author
//! - `Tag`: a globally unique label attached to books through an
//!   association table
//!
//! `Author` and `Tag` carry an optional id: `None` means the value has not
//! been persisted yet. All types serialize to the JSON shapes used by the
//! HTTP API.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ID Types
// ============================================================================

/// Store-generated identifier of an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub i32);

impl AuthorId {
    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for AuthorId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AuthorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Store-generated identifier of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub i32);

impl TagId {
    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for TagId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TagId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Primary key of a book. Caller supplied and immutable once the book exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(pub String);

impl Isbn {
    pub fn new(isbn: impl Into<String>) -> Self {
        Self(isbn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Isbn {
    fn from(isbn: &str) -> Self {
        Self(isbn.to_string())
    }
}

impl From<String> for Isbn {
    fn from(isbn: String) -> Self {
        Self(isbn)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An author of books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Store-generated id, `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AuthorId>,
    pub name: String,
}

impl Author {
    /// Creates an author that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Creates an author with a known id.
    pub fn with_id(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}

/// A book in the catalog.
///
/// A book always has exactly these eight fields. `author_id` defaults to
/// `None` (unattributed) when omitted from the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: Isbn,
    pub amazon_url: String,
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// A label attached to books. Names are unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Store-generated id, `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TagId>,
    pub name: String,
}

impl Tag {
    /// Creates a tag that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}

// ============================================================================
// Update Payloads
// ============================================================================

/// Full replacement of a book's non-key fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub amazon_url: String,
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

impl From<Book> for BookUpdate {
    fn from(book: Book) -> Self {
        Self {
            amazon_url: book.amazon_url,
            author_id: book.author_id,
            language: book.language,
            pages: book.pages,
            publisher: book.publisher,
            title: book.title,
            year: book.year,
        }
    }
}

/// Partial update of a book.
///
/// Only the fields that are `Some` are written. `author_id` is doubly
/// optional so that an explicit `null` (detach from author) can be told
/// apart from an absent field. `isbn` and any other unknown field are
/// rejected during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub author_id: Option<Option<AuthorId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Maps a present JSON field (value or `null`) to `Some(..)`; absence is
/// handled by `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A writable, non-key column of the `books` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    AmazonUrl,
    AuthorId,
    Language,
    Pages,
    Publisher,
    Title,
    Year,
}

impl BookField {
    /// Column name in the `books` table.
    pub const fn column(self) -> &'static str {
        match self {
            Self::AmazonUrl => "amazon_url",
            Self::AuthorId => "author_id",
            Self::Language => "language",
            Self::Pages => "pages",
            Self::Publisher => "publisher",
            Self::Title => "title",
            Self::Year => "year",
        }
    }
}

impl BookPatch {
    /// Fields present in this patch, in column order.
    pub fn fields(&self) -> Vec<BookField> {
        let mut fields = Vec::new();
        if self.amazon_url.is_some() {
            fields.push(BookField::AmazonUrl);
        }
        if self.author_id.is_some() {
            fields.push(BookField::AuthorId);
        }
        if self.language.is_some() {
            fields.push(BookField::Language);
        }
        if self.pages.is_some() {
            fields.push(BookField::Pages);
        }
        if self.publisher.is_some() {
            fields.push(BookField::Publisher);
        }
        if self.title.is_some() {
            fields.push(BookField::Title);
        }
        if self.year.is_some() {
            fields.push(BookField::Year);
        }
        fields
    }

    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Merges the patch into `book`, leaving absent fields untouched.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(amazon_url) = &self.amazon_url {
            book.amazon_url = amazon_url.clone();
        }
        if let Some(author_id) = self.author_id {
            book.author_id = author_id;
        }
        if let Some(language) = &self.language {
            book.language = language.clone();
        }
        if let Some(pages) = self.pages {
            book.pages = pages;
        }
        if let Some(publisher) = &self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(year) = self.year {
            book.year = year;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            isbn: Isbn::from("0691161518"),
            amazon_url: "http://a.co/eobPtX2".to_string(),
            author_id: Some(AuthorId(1)),
            language: "english".to_string(),
            pages: 264,
            publisher: "Princeton University Press".to_string(),
            title: "Power-Up: Unlocking the Hidden Mathematics in Video Games".to_string(),
            year: 2017,
        }
    }

    #[test]
    fn test_book_author_id_defaults_to_none() {
        let json = r#"{
            "isbn": "1234567890",
            "amazon_url": "http://a.co/d9PzSbz",
            "language": "english",
            "pages": 279,
            "publisher": "Vintage Classics",
            "title": "Pride and Prejudice",
            "year": 1813
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.author_id, None);
        assert_eq!(book.isbn.as_str(), "1234567890");
    }

    #[test]
    fn test_book_serializes_null_author() {
        let mut book = sample_book();
        book.author_id = None;
        let value = serde_json::to_value(&book).unwrap();
        assert!(value["author_id"].is_null());
        assert_eq!(value["pages"], 264);
    }

    #[test]
    fn test_author_without_id_omits_it() {
        let value = serde_json::to_value(Author::new("Jane Austen")).unwrap();
        assert!(value.get("id").is_none());

        let value = serde_json::to_value(Author::with_id(AuthorId(1), "Jane Austen")).unwrap();
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: BookPatch = serde_json::from_str(r#"{"pages": 100}"#).unwrap();
        assert_eq!(absent.author_id, None);
        assert_eq!(absent.fields(), vec![BookField::Pages]);

        let null: BookPatch = serde_json::from_str(r#"{"author_id": null}"#).unwrap();
        assert_eq!(null.author_id, Some(None));
        assert_eq!(null.fields(), vec![BookField::AuthorId]);

        let set: BookPatch = serde_json::from_str(r#"{"author_id": 2}"#).unwrap();
        assert_eq!(set.author_id, Some(Some(AuthorId(2))));
    }

    #[test]
    fn test_patch_rejects_isbn() {
        let result = serde_json::from_str::<BookPatch>(r#"{"isbn": "x", "pages": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_patch() {
        let patch: BookPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_apply_changes_only_present_fields() {
        let original = sample_book();
        let mut book = original.clone();
        let patch = BookPatch {
            pages: Some(100),
            ..Default::default()
        };
        patch.apply_to(&mut book);

        assert_eq!(book.pages, 100);
        book.pages = original.pages;
        assert_eq!(book, original);
    }

    #[test]
    fn test_patch_fields_follow_column_order() {
        let patch = BookPatch {
            year: Some(2020),
            amazon_url: Some("u".to_string()),
            title: Some("t".to_string()),
            ..Default::default()
        };
        let columns: Vec<_> = patch.fields().into_iter().map(BookField::column).collect();
        assert_eq!(columns, vec!["amazon_url", "title", "year"]);
    }

    #[test]
    fn test_id_parsing() {
        assert_eq!("42".parse::<AuthorId>().unwrap(), AuthorId(42));
        assert_eq!("7".parse::<TagId>().unwrap(), TagId(7));
        assert!("abc".parse::<AuthorId>().is_err());
    }
}
