//! Queries on the `authors` table and on the `books.author_id` link.
//!
//! Attaching a book to an author always overwrites `author_id`, while
//! detaching only succeeds if the book still belongs to that author.

use bookshelf_core::{Author, AuthorId, Book, Isbn};
use sqlx::PgPool;

use crate::error::{StoreError, StoreResult, is_foreign_key_violation};
use crate::models::{AuthorRow, BookRow};

/// Author query operations for the store.
#[derive(Debug, Clone)]
pub struct Authors<'a> {
    pool: &'a PgPool,
}

impl<'a> Authors<'a> {
    /// Create a new author queries instance.
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an author by id.
    pub async fn find_one(&self, id: AuthorId) -> StoreResult<Author> {
        sqlx::query_as::<_, AuthorRow>(r#"SELECT id, name FROM authors WHERE id = $1"#)
            .bind(id.get())
            .fetch_optional(self.pool)
            .await?
            .map(Author::from)
            .ok_or(StoreError::AuthorNotFound(id))
    }

    /// List all authors in id order.
    pub async fn find_all(&self) -> StoreResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, AuthorRow>(r#"SELECT id, name FROM authors ORDER BY id"#)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    /// Insert a new author.
    pub async fn create(&self, name: &str) -> StoreResult<Author> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            INSERT INTO authors (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(author_id = row.id, "Author created");
        Ok(row.into())
    }

    /// Delete an author and return it.
    ///
    /// Books are not detached automatically: deleting an author that still
    /// owns books fails with `AuthorHasBooks`.
    pub async fn remove(&self, id: AuthorId) -> StoreResult<Author> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            DELETE FROM authors
            WHERE id = $1
            RETURNING id, name
            "#,
        )
        .bind(id.get())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::AuthorHasBooks(id)
            } else {
                StoreError::Database(e)
            }
        })?
        .ok_or(StoreError::AuthorNotFound(id))?;

        tracing::info!(author_id = %id, "Author deleted");
        Ok(row.into())
    }

    /// Books attributed to an author, ordered by title.
    pub async fn books(&self, id: AuthorId) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT isbn, amazon_url, author_id, language, pages, publisher, title, year
            FROM books
            WHERE author_id = $1
            ORDER BY title
            "#,
        )
        .bind(id.get())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Attribute a book to an author.
    ///
    /// A new isbn inserts the whole book under this author. An existing isbn
    /// only has its `author_id` overwritten; its other stored fields are kept
    /// and the fields of `book` are ignored.
    pub async fn add_book(&self, id: AuthorId, book: &Book) -> StoreResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (isbn, amazon_url, author_id, language, pages, publisher, title, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (isbn) DO UPDATE SET author_id = EXCLUDED.author_id
            RETURNING isbn, amazon_url, author_id, language, pages, publisher, title, year
            "#,
        )
        .bind(book.isbn.as_str())
        .bind(&book.amazon_url)
        .bind(id.get())
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::AuthorNotFound(id)
            } else {
                StoreError::Database(e)
            }
        })?;

        tracing::info!(author_id = %id, isbn = %row.isbn, "Book attributed to author");
        Ok(row.into())
    }

    /// Attribute an existing book to an author.
    ///
    /// Only `author_id` is written and the book is never inserted, so a book
    /// deleted in the meantime stays deleted and yields `BookNotFound`.
    pub async fn attach(&self, id: AuthorId, isbn: &Isbn) -> StoreResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET author_id = $1
            WHERE isbn = $2
            RETURNING isbn, amazon_url, author_id, language, pages, publisher, title, year
            "#,
        )
        .bind(id.get())
        .bind(isbn.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::AuthorNotFound(id)
            } else {
                StoreError::Database(e)
            }
        })?
        .ok_or_else(|| StoreError::BookNotFound(isbn.clone()))?;

        tracing::info!(author_id = %id, isbn = %isbn, "Book attributed to author");
        Ok(row.into())
    }

    /// Detach a book from an author.
    ///
    /// Only clears `author_id` if the book still belongs to this author, so a
    /// book that was reassigned in the meantime is left alone. Returns whether
    /// a row changed. Without an isbn there is nothing to detach and the call
    /// trivially succeeds.
    pub async fn remove_book(&self, id: AuthorId, isbn: Option<&Isbn>) -> StoreResult<bool> {
        let Some(isbn) = isbn else {
            return Ok(true);
        };

        let result = sqlx::query(
            r#"
            UPDATE books SET author_id = NULL
            WHERE isbn = $1 AND author_id = $2
            "#,
        )
        .bind(isbn.as_str())
        .bind(id.get())
        .execute(self.pool)
        .await?;

        let detached = result.rows_affected() > 0;
        tracing::info!(author_id = %id, isbn = %isbn, detached, "Book detached from author");
        Ok(detached)
    }

    /// Persist an author.
    ///
    /// With an id, the stored name is updated (`AuthorNotFound` if the id is
    /// unknown). Without one, a new row is inserted and its generated id is
    /// written back into `author`.
    pub async fn save(&self, author: &mut Author) -> StoreResult<()> {
        match author.id {
            Some(id) => {
                let result = sqlx::query("UPDATE authors SET name = $1 WHERE id = $2")
                    .bind(&author.name)
                    .bind(id.get())
                    .execute(self.pool)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::AuthorNotFound(id));
                }
                tracing::info!(author_id = %id, "Author renamed");
            }
            None => {
                let created = self.create(&author.name).await?;
                author.id = created.id;
            }
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use super::*;
    use crate::test_support::{sample_book, setup_store, unique_isbn, unique_name};

    #[tokio::test]
    async fn test_create_find_and_list() {
        let store = setup_store().await;
        let author = store
            .authors()
            .create(&unique_name("Jane Austen"))
            .await
            .unwrap();
        let id = author.id.unwrap();

        assert_eq!(store.authors().find_one(id).await.unwrap(), author);

        let all = store.authors().find_all().await.unwrap();
        assert!(all.contains(&author));
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_find_missing_author() {
        let store = setup_store().await;
        let err = store
            .authors()
            .find_one(AuthorId(i32::MAX))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::AuthorNotFound(AuthorId(i32::MAX))
        ));
    }

    #[tokio::test]
    async fn test_add_book_reassigns_existing_book() {
        let store = setup_store().await;
        let jane = store
            .authors()
            .create(&unique_name("Jane Austen"))
            .await
            .unwrap();
        let george = store
            .authors()
            .create(&unique_name("George Orwell"))
            .await
            .unwrap();
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();

        let attributed = store
            .authors()
            .add_book(jane.id.unwrap(), &book)
            .await
            .unwrap();
        assert_eq!(attributed.author_id, jane.id);

        let janes = store.authors().books(jane.id.unwrap()).await.unwrap();
        assert!(janes.iter().any(|b| b.isbn == book.isbn));
        let georges = store.authors().books(george.id.unwrap()).await.unwrap();
        assert!(georges.iter().all(|b| b.isbn != book.isbn));
    }

    #[tokio::test]
    async fn test_add_book_keeps_stored_fields_on_conflict() {
        let store = setup_store().await;
        let author = store
            .authors()
            .create(&unique_name("Fyodor Dostoevsky"))
            .await
            .unwrap();
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();

        let mut other = book.clone();
        other.title = "Ignored".to_string();
        let attributed = store
            .authors()
            .add_book(author.id.unwrap(), &other)
            .await
            .unwrap();
        assert_eq!(attributed.title, book.title);
    }

    #[tokio::test]
    async fn test_add_book_inserts_new_book() {
        let store = setup_store().await;
        let author = store
            .authors()
            .create(&unique_name("William Shakespeare"))
            .await
            .unwrap();
        let book = sample_book(unique_isbn(), None);

        let created = store
            .authors()
            .add_book(author.id.unwrap(), &book)
            .await
            .unwrap();
        assert_eq!(created.author_id, author.id);
        assert_eq!(store.books().find_one(&book.isbn).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_attach_sets_owner_only() {
        let store = setup_store().await;
        let author = store
            .authors()
            .create(&unique_name("Virginia Woolf"))
            .await
            .unwrap();
        let id = author.id.unwrap();
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();

        let attached = store.authors().attach(id, &book.isbn).await.unwrap();
        assert_eq!(attached.author_id, Some(id));
        assert_eq!(attached.title, book.title);
        assert_eq!(store.books().find_one(&book.isbn).await.unwrap(), attached);
    }

    #[tokio::test]
    async fn test_attach_does_not_recreate_removed_book() {
        let store = setup_store().await;
        let author = store
            .authors()
            .create(&unique_name("Franz Kafka"))
            .await
            .unwrap();
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();
        store.books().remove(&book.isbn).await.unwrap();

        let err = store
            .authors()
            .attach(author.id.unwrap(), &book.isbn)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BookNotFound(_)));
        assert!(!store.books().exists(&book.isbn).await.unwrap());
    }

    #[tokio::test]
    async fn test_attach_unknown_author() {
        let store = setup_store().await;
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();

        let err = store
            .authors()
            .attach(AuthorId(i32::MAX), &book.isbn)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::AuthorNotFound(AuthorId(i32::MAX))
        ));
        assert_eq!(store.books().find_one(&book.isbn).await.unwrap(), book);
    }

    #[tokio::test]
    async fn test_remove_book_is_guarded_by_owner() {
        let store = setup_store().await;
        let jane = store
            .authors()
            .create(&unique_name("Jane Austen"))
            .await
            .unwrap();
        let george = store
            .authors()
            .create(&unique_name("George Orwell"))
            .await
            .unwrap();
        let book = sample_book(unique_isbn(), jane.id);
        store.books().create(&book).await.unwrap();

        // George does not own the book, so nothing changes.
        let detached = store
            .authors()
            .remove_book(george.id.unwrap(), Some(&book.isbn))
            .await
            .unwrap();
        assert!(!detached);
        assert_eq!(
            store.books().find_one(&book.isbn).await.unwrap().author_id,
            jane.id
        );

        let detached = store
            .authors()
            .remove_book(jane.id.unwrap(), Some(&book.isbn))
            .await
            .unwrap();
        assert!(detached);
        assert_eq!(
            store.books().find_one(&book.isbn).await.unwrap().author_id,
            None
        );

        assert!(
            store
                .authors()
                .remove_book(jane.id.unwrap(), None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_remove_author() {
        let store = setup_store().await;
        let author = store
            .authors()
            .create(&unique_name("Leo Tolstoy"))
            .await
            .unwrap();
        let id = author.id.unwrap();
        let book = sample_book(unique_isbn(), author.id);
        store.books().create(&book).await.unwrap();

        let err = store.authors().remove(id).await.unwrap_err();
        assert!(matches!(err, StoreError::AuthorHasBooks(_)));

        store
            .authors()
            .remove_book(id, Some(&book.isbn))
            .await
            .unwrap();
        let removed = store.authors().remove(id).await.unwrap();
        assert_eq!(removed, author);

        let err = store.authors().remove(id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_inserts_or_updates() {
        let store = setup_store().await;

        let mut author = Author::new(unique_name("Mary Shelley"));
        store.authors().save(&mut author).await.unwrap();
        let id = author.id.expect("save must adopt the generated id");
        assert_eq!(store.authors().find_one(id).await.unwrap(), author);

        author.name = unique_name("Mary Wollstonecraft Shelley");
        store.authors().save(&mut author).await.unwrap();
        assert_eq!(author.id, Some(id));
        assert_eq!(
            store.authors().find_one(id).await.unwrap().name,
            author.name
        );

        let mut missing = Author::with_id(AuthorId(i32::MAX), "Nobody");
        let err = store.authors().save(&mut missing).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
