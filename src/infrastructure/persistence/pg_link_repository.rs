//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link storage and retrieval.
///
/// Endings are stored canonicalized; the `UNIQUE (ending)` constraint decides
/// races between concurrent inserts.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn tags_for(&self, link_id: i64) -> Result<BTreeSet<String>, AppError> {
        let tags: Vec<String> = sqlx::query_scalar(
            "SELECT tag_name FROM link_tags WHERE link_id = $1 ORDER BY tag_name",
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(tags.into_iter().collect())
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    ending: String,
    target_url: String,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_link(self, tags: BTreeSet<String>) -> Link {
        Link::new(
            self.id,
            self.ending,
            self.target_url,
            self.created_at,
            self.last_modified_at,
            tags,
        )
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError> {
        if new_links.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut links = Vec::with_capacity(new_links.len());

        for new_link in new_links {
            let row: LinkRow = sqlx::query_as(
                r#"
                INSERT INTO links (ending, target_url)
                VALUES ($1, $2)
                RETURNING id, ending, target_url, created_at, last_modified_at
                "#,
            )
            .bind(&new_link.ending)
            .bind(&new_link.target_url)
            .fetch_one(&mut *tx)
            .await?;

            if !new_link.tags.is_empty() {
                let tags: Vec<String> = new_link.tags.iter().cloned().collect();
                sqlx::query(
                    r#"
                    INSERT INTO link_tags (link_id, tag_name)
                    SELECT $1, UNNEST($2::text[])
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(row.id)
                .bind(&tags)
                .execute(&mut *tx)
                .await?;
            }

            links.push(row.into_link(new_link.tags));
        }

        let endings: Vec<String> = links.iter().map(|l| l.ending.clone()).collect();
        sqlx::query("DELETE FROM pending_endings WHERE ending = ANY($1)")
            .bind(&endings)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(links)
    }

    async fn find_by_ending(&self, ending: &str) -> Result<Option<Link>, AppError> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"
            SELECT id, ending, target_url, created_at, last_modified_at
            FROM links
            WHERE ending = $1
            "#,
        )
        .bind(ending)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => {
                let tags = self.tags_for(row.id).await?;
                Ok(Some(row.into_link(tags)))
            }
            None => Ok(None),
        }
    }

    async fn existing_endings(&self, endings: &[String]) -> Result<Vec<String>, AppError> {
        if endings.is_empty() {
            return Ok(Vec::new());
        }

        let existing = sqlx::query_scalar("SELECT ending FROM links WHERE ending = ANY($1)")
            .bind(endings)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(existing)
    }

    async fn delete_by_endings(&self, endings: &[String]) -> Result<u64, AppError> {
        if endings.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM links WHERE ending = ANY($1)")
            .bind(endings)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
