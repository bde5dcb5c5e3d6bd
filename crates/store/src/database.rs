//! SQLite database for resource metadata storage.

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Row,
};

use crate::error::{Result, StoreError};

/// A resource record mapping a short identifier to stored content.
///
/// Link-type resources carry the sentinel mime type `text/uri-list` and a
/// target URL in `locator`; any other mime type marks a blob-type resource
/// whose `locator` is the blob's storage key.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub mime_type: String,
    pub name: Option<String>,
    pub locator: String,
    pub created_at: i64,
}

/// SQLite database connection pool.
///
/// The index is append-only: records are inserted exactly once and never
/// updated or deleted.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection from a file path.
    pub async fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create an in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(":memory:");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert a new resource record.
    ///
    /// Fails with [`StoreError::Conflict`] if a resource with this identifier
    /// already exists. The primary-key constraint makes concurrent inserts of
    /// the same identifier resolve to exactly one success.
    pub async fn insert_resource(
        &self,
        id: &str,
        mime_type: &str,
        name: Option<&str>,
        locator: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO resources (id, mime_type, name, locator, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(mime_type)
        .bind(name)
        .bind(locator)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(id.to_string())
            }
            _ => StoreError::Database(err),
        })?;
        Ok(())
    }

    /// Get a resource record by identifier.
    pub async fn find_resource(&self, id: &str) -> Result<Option<Resource>> {
        let row = sqlx::query(
            r#"
            SELECT id, mime_type, name, locator, created_at
            FROM resources
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Resource {
            id: r.get("id"),
            mime_type: r.get("mime_type"),
            name: r.get("name"),
            locator: r.get("locator"),
            created_at: r.get("created_at"),
        }))
    }

    /// Check that the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
