//! Queries on the `books` table and the `books_tags` association.
//!
//! - Full update replaces every non-key column in one statement
//! - Partial update writes exactly the fields present in a `BookPatch`
//! - Tagging is idempotent: the pair is inserted with `ON CONFLICT DO NOTHING`
//!
//! The isbn is never part of an update's `SET` list.

use bookshelf_core::{AuthorId, Book, BookField, BookPatch, BookUpdate, Isbn, Tag};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{
    StoreError, StoreResult, book_write_error, is_foreign_key_violation, violated_constraint,
};
use crate::models::{BookRow, TagRow};
use crate::tags;

/// Book query operations for the store.
#[derive(Debug, Clone)]
pub struct Books<'a> {
    pool: &'a PgPool,
}

impl<'a> Books<'a> {
    /// Create a new book queries instance.
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a book by isbn.
    pub async fn find_one(&self, isbn: &Isbn) -> StoreResult<Book> {
        sqlx::query_as::<_, BookRow>(
            r#"
            SELECT isbn, amazon_url, author_id, language, pages, publisher, title, year
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_str())
        .fetch_optional(self.pool)
        .await?
        .map(Book::from)
        .ok_or_else(|| StoreError::BookNotFound(isbn.clone()))
    }

    /// Check if a book exists.
    pub async fn exists(&self, isbn: &Isbn) -> StoreResult<bool> {
        let result: (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM books WHERE isbn = $1)"#)
                .bind(isbn.as_str())
                .fetch_one(self.pool)
                .await?;

        Ok(result.0)
    }

    /// List all books ordered by title.
    pub async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT isbn, amazon_url, author_id, language, pages, publisher, title, year
            FROM books
            ORDER BY title
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Insert a new book.
    ///
    /// Fails with `DuplicateBook` if the isbn is taken and with
    /// `UnknownAuthor` if `author_id` does not reference an author.
    pub async fn create(&self, book: &Book) -> StoreResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (isbn, amazon_url, author_id, language, pages, publisher, title, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING isbn, amazon_url, author_id, language, pages, publisher, title, year
            "#,
        )
        .bind(book.isbn.as_str())
        .bind(&book.amazon_url)
        .bind(book.author_id.map(AuthorId::get))
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(self.pool)
        .await
        .map_err(|e| book_write_error(&book.isbn, book.author_id, e))?;

        tracing::info!(isbn = %row.isbn, "Book created");
        Ok(row.into())
    }

    /// Replace every non-key field of an existing book.
    pub async fn update(&self, isbn: &Isbn, update: &BookUpdate) -> StoreResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET
                amazon_url = $1,
                author_id = $2,
                language = $3,
                pages = $4,
                publisher = $5,
                title = $6,
                year = $7
            WHERE isbn = $8
            RETURNING isbn, amazon_url, author_id, language, pages, publisher, title, year
            "#,
        )
        .bind(&update.amazon_url)
        .bind(update.author_id.map(AuthorId::get))
        .bind(&update.language)
        .bind(update.pages)
        .bind(&update.publisher)
        .bind(&update.title)
        .bind(update.year)
        .bind(isbn.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| book_write_error(isbn, update.author_id, e))?
        .ok_or_else(|| StoreError::BookNotFound(isbn.clone()))?;

        tracing::info!(isbn = %isbn, "Book updated");
        Ok(row.into())
    }

    /// Write only the fields present in `patch`.
    ///
    /// An empty patch writes nothing and returns the current book.
    pub async fn partial_update(&self, isbn: &Isbn, patch: &BookPatch) -> StoreResult<Book> {
        if patch.is_empty() {
            tracing::debug!(isbn = %isbn, "Empty patch, returning stored book");
            return self.find_one(isbn).await;
        }

        let fields = patch.fields();

        let mut query = QueryBuilder::<Postgres>::new("UPDATE books SET ");
        {
            let mut set = query.separated(", ");
            for field in &fields {
                set.push(field.column());
                set.push_unseparated(" = ");
                match field {
                    BookField::AmazonUrl => set.push_bind_unseparated(patch.amazon_url.clone()),
                    BookField::AuthorId => {
                        set.push_bind_unseparated(patch.author_id.flatten().map(AuthorId::get))
                    }
                    BookField::Language => set.push_bind_unseparated(patch.language.clone()),
                    BookField::Pages => set.push_bind_unseparated(patch.pages),
                    BookField::Publisher => set.push_bind_unseparated(patch.publisher.clone()),
                    BookField::Title => set.push_bind_unseparated(patch.title.clone()),
                    BookField::Year => set.push_bind_unseparated(patch.year),
                };
            }
        }
        query.push(" WHERE isbn = ");
        query.push_bind(isbn.to_string());
        query.push(
            " RETURNING isbn, amazon_url, author_id, language, pages, publisher, title, year",
        );

        let row = query
            .build_query_as::<BookRow>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| book_write_error(isbn, patch.author_id.flatten(), e))?
            .ok_or_else(|| StoreError::BookNotFound(isbn.clone()))?;

        tracing::info!(isbn = %isbn, fields = fields.len(), "Book patched");
        Ok(row.into())
    }

    /// Delete a book. Its tag links go with it.
    pub async fn remove(&self, isbn: &Isbn) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::BookNotFound(isbn.clone()));
        }

        tracing::info!(isbn = %isbn, "Book deleted");
        Ok(())
    }

    /// Tags linked to a book, ordered by name.
    pub async fn tags(&self, isbn: &Isbn) -> StoreResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT tags.id, tags.name
            FROM tags
            JOIN books_tags ON books_tags.tag_id = tags.id
            WHERE books_tags.book_isbn = $1
            ORDER BY tags.name
            "#,
        )
        .bind(isbn.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    /// Link a tag to a book.
    ///
    /// A tag without an id is first resolved by name, creating it if no tag
    /// has that name yet, and the resolved id is written back into `tag`.
    /// Linking an already linked pair is a no-op. Both steps share one
    /// transaction, so a failed link does not leave a new tag behind.
    ///
    /// Returns `true` when a new link was created.
    pub async fn add_tag(&self, isbn: &Isbn, tag: &mut Tag) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let tag_id = match tag.id {
            Some(id) => id,
            None => tags::get_or_create(&mut *tx, &tag.name).await?,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO books_tags (book_isbn, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (book_isbn, tag_id) DO NOTHING
            "#,
        )
        .bind(isbn.as_str())
        .bind(tag_id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if !is_foreign_key_violation(&e) {
                return StoreError::Database(e);
            }
            match violated_constraint(&e) {
                Some(constraint) if constraint.contains("book_isbn") => {
                    StoreError::BookNotFound(isbn.clone())
                }
                _ => StoreError::TagNotFound(tag_id),
            }
        })?;

        tx.commit().await?;
        tag.id = Some(tag_id);

        let linked = result.rows_affected() > 0;
        tracing::info!(isbn = %isbn, tag_id = %tag_id, linked, "Tag added to book");
        Ok(linked)
    }
}
