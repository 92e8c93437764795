//! PostgreSQL implementation of the ending pool repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::PendingEnding;
use crate::domain::repositories::EndingPoolRepository;
use crate::error::AppError;

/// PostgreSQL repository for pending endings.
///
/// Claims use `FOR UPDATE SKIP LOCKED` inside a single `DELETE ... RETURNING`,
/// so concurrent claims never see the same row.
pub struct PgEndingPoolRepository {
    pool: Arc<PgPool>,
}

impl PgEndingPoolRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndingPoolRepository for PgEndingPoolRepository {
    async fn insert(&self, endings: Vec<PendingEnding>) -> Result<u64, AppError> {
        if endings.is_empty() {
            return Ok(0);
        }

        let (values, created): (Vec<String>, Vec<DateTime<Utc>>) = endings
            .into_iter()
            .map(|e| (e.ending, e.created_at))
            .unzip();

        let result = sqlx::query(
            r#"
            INSERT INTO pending_endings (ending, created_at)
            SELECT e.ending, e.created_at
            FROM UNNEST($1::text[], $2::timestamptz[]) AS e(ending, created_at)
            WHERE NOT EXISTS (SELECT 1 FROM links l WHERE l.ending = e.ending)
            ON CONFLICT (ending) DO NOTHING
            "#,
        )
        .bind(&values)
        .bind(&created)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn claim(&self, limit: usize) -> Result<Vec<String>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let endings = sqlx::query_scalar(
            r#"
            DELETE FROM pending_endings
            WHERE ending IN (
                SELECT ending
                FROM pending_endings
                ORDER BY created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING ending
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(endings)
    }

    async fn delete_by_endings(&self, endings: &[String]) -> Result<u64, AppError> {
        if endings.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM pending_endings WHERE ending = ANY($1)")
            .bind(endings)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn existing_endings(&self, endings: &[String]) -> Result<Vec<String>, AppError> {
        if endings.is_empty() {
            return Ok(Vec::new());
        }

        let existing =
            sqlx::query_scalar("SELECT ending FROM pending_endings WHERE ending = ANY($1)")
                .bind(endings)
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(existing)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM pending_endings")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
