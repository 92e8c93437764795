//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    Click, Coordinates, Geography, HistogramBucket, HistogramInterval, LocationCount,
    LocationLevel, NewClick,
};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL repository for recorded visits.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    ending: String,
    target_url: String,
    clicked_at: DateTime<Utc>,
    country_code: Option<String>,
    country_name: Option<String>,
    region_code: Option<String>,
    region_name: Option<String>,
    postal_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    referrer_url: Option<String>,
    identifying_hash: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        let coordinates = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Click {
            id: row.id,
            link_id: row.link_id,
            ending: row.ending,
            target_url: row.target_url,
            clicked_at: row.clicked_at,
            geography: Geography {
                country_code: row.country_code,
                country_name: row.country_name,
                region_code: row.region_code,
                region_name: row.region_name,
                postal_code: row.postal_code,
                coordinates,
            },
            referrer_url: row.referrer_url,
            identifying_hash: row.identifying_hash,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    code: String,
    name: Option<String>,
    count: i64,
}

/// Grouping query per location level; the first column is the code.
fn geography_query(level: LocationLevel) -> &'static str {
    match level {
        LocationLevel::Country => {
            r#"
            SELECT country_code AS code, country_name AS name, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1 AND clicked_at >= $2 AND clicked_at < $3
              AND country_code IS NOT NULL
            GROUP BY country_code, country_name
            ORDER BY count DESC, code
            "#
        }
        LocationLevel::Region => {
            r#"
            SELECT region_code AS code, region_name AS name, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1 AND clicked_at >= $2 AND clicked_at < $3
              AND region_code IS NOT NULL
            GROUP BY region_code, region_name
            ORDER BY count DESC, code
            "#
        }
        LocationLevel::PostalCode => {
            r#"
            SELECT postal_code AS code, NULL::TEXT AS name, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1 AND clicked_at >= $2 AND clicked_at < $3
              AND postal_code IS NOT NULL
            GROUP BY postal_code
            ORDER BY count DESC, code
            "#
        }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError> {
        let geography = new_click.geography;
        let (latitude, longitude) = match geography.coordinates {
            Some(c) => (Some(c.latitude), Some(c.longitude)),
            None => (None, None),
        };

        let row: ClickRow = sqlx::query_as(
            r#"
            INSERT INTO clicks (
                link_id, ending, target_url, clicked_at,
                country_code, country_name, region_code, region_name, postal_code,
                latitude, longitude, referrer_url, identifying_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, link_id, ending, target_url, clicked_at,
                      country_code, country_name, region_code, region_name, postal_code,
                      latitude, longitude, referrer_url, identifying_hash
            "#,
        )
        .bind(new_click.link_id)
        .bind(&new_click.ending)
        .bind(&new_click.target_url)
        .bind(new_click.clicked_at)
        .bind(&geography.country_code)
        .bind(&geography.country_name)
        .bind(&geography.region_code)
        .bind(&geography.region_name)
        .bind(&geography.postal_code)
        .bind(latitude)
        .bind(longitude)
        .bind(&new_click.referrer_url)
        .bind(&new_click.identifying_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn histogram(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: HistogramInterval,
    ) -> Result<Vec<HistogramBucket>, AppError> {
        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            r#"
            SELECT date_trunc($2, clicked_at AT TIME ZONE 'UTC') AT TIME ZONE 'UTC' AS bucket,
                   COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1 AND clicked_at >= $3 AND clicked_at < $4
            GROUP BY bucket
            ORDER BY bucket
            "#,
        )
        .bind(link_id)
        .bind(interval.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(start, count)| HistogramBucket { start, count })
            .collect())
    }

    async fn geography(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        level: LocationLevel,
    ) -> Result<Vec<LocationCount>, AppError> {
        let rows: Vec<LocationRow> = sqlx::query_as(geography_query(level))
            .bind(link_id)
            .bind(start)
            .bind(end)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| LocationCount {
                code: row.code,
                name: row.name,
                count: row.count,
            })
            .collect())
    }
}
