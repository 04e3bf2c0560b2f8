//! Schema definitions and migration utilities.
//!
//! This module provides the embedded SQL schema and utilities
//! for applying it.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the catalog schema (001_schema.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_schema.sql");

/// Advisory lock key held while migrating.
const MIGRATION_LOCK_KEY: i64 = 0x626f_6f6b_7368_656c;

/// Run all pending migrations against the database.
///
/// This function is idempotent - it can be run multiple times safely.
/// Migrations check for existing objects before creating them, and
/// concurrent callers are serialized with a session advisory lock since
/// `CREATE TABLE IF NOT EXISTS` is not safe against itself.
///
/// # Errors
///
/// Returns an error if any migration fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    let mut conn = pool.acquire().await?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    tracing::debug!("Running schema migration (001_schema.sql)...");
    let migrated = sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Migration(format!("Schema migration failed: {}", e)));

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    migrated?;
    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if the `books_tags` table, the last one created, exists.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let result: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = 'books_tags'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_migration_embedded() {
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS authors"));
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS books"));
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS tags"));
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS books_tags"));
    }

    #[test]
    fn test_schema_constraints() {
        assert!(SCHEMA_MIGRATION.contains("name TEXT NOT NULL UNIQUE"));
        assert!(SCHEMA_MIGRATION.contains("PRIMARY KEY (book_isbn, tag_id)"));
        assert!(SCHEMA_MIGRATION.contains("REFERENCES authors (id)"));
    }
}
