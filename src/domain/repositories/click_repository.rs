//! Repository trait for recorded visits.

use crate::domain::entities::{
    Click, HistogramBucket, HistogramInterval, LocationCount, LocationLevel, NewClick,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for click events.
///
/// Clicks are append-only; there is no update or delete path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Records a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors, including a
    /// `link_id` that no longer references a link.
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts a link's clicks in `[start, end)` per UTC bucket, oldest first.
    /// Empty buckets are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn histogram(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: HistogramInterval,
    ) -> Result<Vec<HistogramBucket>, AppError>;

    /// Counts a link's clicks in `[start, end)` per place, most clicked
    /// first. Clicks without a code at `level` are left out.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn geography(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        level: LocationLevel,
    ) -> Result<Vec<LocationCount>, AppError>;
}
