//! Queries on the `tags` table.
//!
//! Tag names are unique. Creating a tag by name goes through
//! `get_or_create`, which tolerates concurrent creators: the insert is
//! conflict-tolerant and the authoritative id is always re-read by name,
//! whether or not this caller's insert produced the row.

use bookshelf_core::{Book, Tag, TagId};
use sqlx::{PgConnection, PgPool};

use crate::error::{StoreError, StoreResult, is_unique_violation};
use crate::models::{BookRow, TagRow};

/// Tag query operations for the store.
#[derive(Debug, Clone)]
pub struct Tags<'a> {
    pool: &'a PgPool,
}

impl<'a> Tags<'a> {
    /// Create a new tag queries instance.
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new tag. Fails with `DuplicateTag` if the name is taken.
    pub async fn create(&self, name: &str) -> StoreResult<Tag> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| duplicate_name(name, e))?;

        tracing::info!(tag_id = row.id, name = %row.name, "Tag created");
        Ok(row.into())
    }

    /// Get a tag by id.
    pub async fn find_one(&self, id: TagId) -> StoreResult<Tag> {
        sqlx::query_as::<_, TagRow>(r#"SELECT id, name FROM tags WHERE id = $1"#)
            .bind(id.get())
            .fetch_optional(self.pool)
            .await?
            .map(Tag::from)
            .ok_or(StoreError::TagNotFound(id))
    }

    /// Get a tag by its unique name.
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(
            sqlx::query_as::<_, TagRow>(r#"SELECT id, name FROM tags WHERE name = $1"#)
                .bind(name)
                .fetch_optional(self.pool)
                .await?
                .map(Tag::from),
        )
    }

    /// List all tags.
    pub async fn find_all(&self) -> StoreResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(r#"SELECT id, name FROM tags ORDER BY name"#)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    /// Delete a tag and return it. Its book links go with it.
    pub async fn remove(&self, id: TagId) -> StoreResult<Tag> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            DELETE FROM tags
            WHERE id = $1
            RETURNING id, name
            "#,
        )
        .bind(id.get())
        .fetch_optional(self.pool)
        .await?
        .ok_or(StoreError::TagNotFound(id))?;

        tracing::info!(tag_id = %id, "Tag deleted");
        Ok(row.into())
    }

    /// Books linked to a tag, ordered by title.
    pub async fn books(&self, id: TagId) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT books.isbn, books.amazon_url, books.author_id, books.language,
                   books.pages, books.publisher, books.title, books.year
            FROM books
            JOIN books_tags ON books_tags.book_isbn = books.isbn
            WHERE books_tags.tag_id = $1
            ORDER BY books.title
            "#,
        )
        .bind(id.get())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Persist a tag.
    ///
    /// With an id, the name of that tag is updated. Without one, the tag is
    /// resolved by name (created if missing) and the resolved id is written
    /// back into `tag`.
    pub async fn save(&self, tag: &mut Tag) -> StoreResult<()> {
        match tag.id {
            Some(id) => {
                let result = sqlx::query("UPDATE tags SET name = $1 WHERE id = $2")
                    .bind(&tag.name)
                    .bind(id.get())
                    .execute(self.pool)
                    .await
                    .map_err(|e| duplicate_name(&tag.name, e))?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::TagNotFound(id));
                }
                tracing::info!(tag_id = %id, name = %tag.name, "Tag renamed");
            }
            None => {
                let mut conn = self.pool.acquire().await?;
                let id = get_or_create(&mut *conn, &tag.name).await?;
                tag.id = Some(id);
            }
        }
        Ok(())
    }
}

/// Resolve a tag id by name, inserting the tag if no row has that name.
///
/// The insert is `ON CONFLICT DO NOTHING`, so under a concurrent creator it
/// may return nothing; the follow-up lookup by name is what yields the id.
pub(crate) async fn get_or_create(conn: &mut PgConnection, name: &str) -> StoreResult<TagId> {
    sqlx::query(
        r#"
        INSERT INTO tags (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(name)
    .execute(&mut *conn)
    .await?;

    let (id,): (i32,) = sqlx::query_as(r#"SELECT id FROM tags WHERE name = $1"#)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    tracing::debug!(tag_id = id, name = %name, "Resolved tag by name");
    Ok(TagId(id))
}

fn duplicate_name(name: &str, error: sqlx::Error) -> StoreError {
    if is_unique_violation(&error) {
        StoreError::DuplicateTag(name.to_string())
    } else {
        StoreError::Database(error)
    }
}

#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use super::*;
    use crate::test_support::{sample_book, setup_store, unique_isbn, unique_name};

    #[tokio::test]
    async fn test_create_and_find() {
        let store = setup_store().await;
        let name = unique_name("poetry");

        let tag = store.tags().create(&name).await.unwrap();
        let id = tag.id.unwrap();
        assert_eq!(store.tags().find_one(id).await.unwrap(), tag);
        assert_eq!(
            store.tags().find_by_name(&name).await.unwrap(),
            Some(tag.clone())
        );
        assert!(store.tags().find_all().await.unwrap().contains(&tag));

        let err = store.tags().create(&name).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTag(n) if n == name));
    }

    #[tokio::test]
    async fn test_save_without_id_adopts_existing_row() {
        let store = setup_store().await;
        let name = unique_name("drama");
        let existing = store.tags().create(&name).await.unwrap();

        let mut tag = Tag::new(name);
        store.tags().save(&mut tag).await.unwrap();
        assert_eq!(tag.id, existing.id);
    }

    #[tokio::test]
    async fn test_save_without_id_creates_row() {
        let store = setup_store().await;
        let name = unique_name("satire");

        let mut tag = Tag::new(name.clone());
        store.tags().save(&mut tag).await.unwrap();

        let stored = store.tags().find_by_name(&name).await.unwrap().unwrap();
        assert_eq!(stored.id, tag.id);
    }

    #[tokio::test]
    async fn test_save_with_id_renames() {
        let store = setup_store().await;
        let mut tag = store.tags().create(&unique_name("old")).await.unwrap();

        tag.name = unique_name("new");
        store.tags().save(&mut tag).await.unwrap();
        let stored = store.tags().find_one(tag.id.unwrap()).await.unwrap();
        assert_eq!(stored.name, tag.name);

        let mut missing = Tag::with_id(TagId(i32::MAX), unique_name("missing"));
        let err = store.tags().save(&mut missing).await.unwrap_err();
        assert!(matches!(err, StoreError::TagNotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_keeps_books() {
        let store = setup_store().await;
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();
        let mut tag = Tag::new(unique_name("history"));
        store.books().add_tag(&book.isbn, &mut tag).await.unwrap();
        let id = tag.id.unwrap();

        assert_eq!(store.tags().books(id).await.unwrap(), vec![book.clone()]);

        let removed = store.tags().remove(id).await.unwrap();
        assert_eq!(removed, tag);
        assert!(store.books().tags(&book.isbn).await.unwrap().is_empty());
        assert!(store.books().exists(&book.isbn).await.unwrap());

        let err = store.tags().remove(id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tag_outlives_its_last_book() {
        let store = setup_store().await;
        let book = sample_book(unique_isbn(), None);
        store.books().create(&book).await.unwrap();
        let mut tag = Tag::new(unique_name("ephemeral"));
        store.books().add_tag(&book.isbn, &mut tag).await.unwrap();

        store.books().remove(&book.isbn).await.unwrap();

        let id = tag.id.unwrap();
        assert_eq!(store.tags().find_one(id).await.unwrap(), tag);
        assert!(store.tags().books(id).await.unwrap().is_empty());
    }
}
