use async_trait::async_trait;
use jiff::Timestamp;
use linkhop_core::repository::{Repository, Result};
use linkhop_core::{Mapping, MappingId, ShortCode, StorageError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::trace;

/// MySQL implementation of the repository contract.
///
/// Rows live in `url_mappings` (see `ddl/mysql/url_mappings.sql`). The
/// `UNIQUE` index on `short_code` is what rejects a losing concurrent
/// insert; it uses a binary collation so codes differing only in case are
/// distinct. Rows are never deleted.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn decode_mapping(row: MySqlRow) -> Result<Mapping> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
    let click_count: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(Mapping {
        id: MappingId::new(id),
        short_code: ShortCode::new_unchecked(short_code),
        long_url,
        click_count,
        created_at: parse_created_at(created_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, long_url, click_count, created_at
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(decode_mapping).transpose()
    }

    async fn insert_unique(&self, code: &ShortCode, long_url: &str) -> Result<Mapping> {
        // Stored with second precision; keep the returned value identical to
        // what a later read produces.
        let created_at = parse_created_at(Timestamp::now().as_second())?;

        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_code, long_url, click_count, created_at)
            VALUES (?, ?, 0, ?)
            "#,
        )
        .bind(code.as_str())
        .bind(long_url)
        .bind(created_at.as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = MappingId::new(done.last_insert_id());
                trace!(code = %code, id = %id, "inserted mapping");
                Ok(Mapping {
                    id,
                    short_code: code.clone(),
                    long_url: long_url.to_owned(),
                    click_count: 0,
                    created_at,
                })
            }
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_click(&self, id: MappingId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE url_mappings
            SET click_count = click_count + 1
            WHERE id = ?
            "#,
        )
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::MissingMapping(id));
        }

        Ok(())
    }
}
