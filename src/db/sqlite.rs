use crate::db::models::PasteRow;
use crate::db::schema::SQLITE_INIT;
use crate::error::PasteError;
use crate::service::paste_store::PasteEntry;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct SqlitePasteStorage {
    pool: SqlitePool,
}

impl SqlitePasteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, PasteError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new();
        // every connection to `:memory:` is a separate database
        if database_url.contains(":memory:") {
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), PasteError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn put(
        &self,
        id: &str,
        content: &str,
        ttl: Option<Duration>,
    ) -> Result<(), PasteError> {
        let now = Utc::now().timestamp();
        let expires_at = ttl.map(|d| now.saturating_add(d.as_secs() as i64));
        self.put_at(id, content, now, expires_at).await
    }

    /// Upsert by id. `created_at` survives overwrites.
    pub(crate) async fn put_at(
        &self,
        id: &str,
        content: &str,
        now: i64,
        expires_at: Option<i64>,
    ) -> Result<(), PasteError> {
        sqlx::query(
            r#"
            INSERT INTO pastes (id, content, created_at, updated_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                content=excluded.content,
                updated_at=excluded.updated_at,
                expires_at=excluded.expires_at
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(now)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<String>, PasteError> {
        let now = Utc::now().timestamp();
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT content FROM pastes WHERE id = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn get_row(&self, id: &str) -> Result<Option<PasteRow>, PasteError> {
        let row = sqlx::query_as::<_, PasteRow>(
            r#"SELECT id, content, created_at, updated_at, expires_at
               FROM pastes WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Live pastes only, ordered by id.
    pub async fn list(&self) -> Result<Vec<PasteEntry>, PasteError> {
        let now = Utc::now().timestamp();
        let rows = sqlx::query_as::<_, PasteRow>(
            r#"SELECT id, content, created_at, updated_at, expires_at
               FROM pastes WHERE expires_at IS NULL OR expires_at > ?
               ORDER BY id"#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|row| row.to_entry(now)).collect())
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, PasteError> {
        let result = sqlx::query("DELETE FROM pastes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove expired rows, returning how many were dropped.
    pub async fn purge_expired(&self) -> Result<u64, PasteError> {
        let now = Utc::now().timestamp();
        let result =
            sqlx::query("DELETE FROM pastes WHERE expires_at IS NOT NULL AND expires_at <= ?")
                .bind(now)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
