//! Click statistics for a single short link.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::domain::entities::{
    HistogramBucket, HistogramInterval, Link, LocationCount, LocationLevel, canonical_ending,
};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Days covered when a query gives no start time.
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Half-open time range `[start, end)` a statistic covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Clicks over time for one link.
#[derive(Debug, Clone)]
pub struct ClickHistogram {
    pub link: Link,
    pub window: StatsWindow,
    pub interval: HistogramInterval,
    pub buckets: Vec<HistogramBucket>,
}

/// Clicks per place for one link.
#[derive(Debug, Clone)]
pub struct ClickGeography {
    pub link: Link,
    pub window: StatsWindow,
    pub level: LocationLevel,
    pub locations: Vec<LocationCount>,
}

/// Service for aggregated click statistics.
pub struct StatsService<L, C>
where
    L: LinkRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    link_repository: Arc<L>,
    click_repository: Arc<C>,
}

impl<L, C> StatsService<L, C>
where
    L: LinkRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    /// Creates a new statistics service.
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>) -> Self {
        Self {
            link_repository,
            click_repository,
        }
    }

    /// Counts clicks on `ending` per time bucket.
    ///
    /// Without a start the window opens 30 days before its end, rounded
    /// down to a bucket boundary; without an end it closes now.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has this ending
    /// - [`AppError::Validation`] if the window is empty
    /// - [`AppError::Internal`] on database errors
    pub async fn histogram(
        &self,
        ending: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        interval: HistogramInterval,
    ) -> Result<ClickHistogram, AppError> {
        let window = resolve_window(start, end, interval)?;
        let link = self.find_link(ending).await?;

        let buckets = self
            .click_repository
            .histogram(link.id, window.start, window.end, interval)
            .await?;

        Ok(ClickHistogram {
            link,
            window,
            interval,
            buckets,
        })
    }

    /// Counts clicks on `ending` per country, region or postal code.
    ///
    /// The default window is the same as for [`Self::histogram`] with
    /// daily buckets.
    ///
    /// # Errors
    ///
    /// See [`Self::histogram`].
    pub async fn geography(
        &self,
        ending: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        level: LocationLevel,
    ) -> Result<ClickGeography, AppError> {
        let window = resolve_window(start, end, HistogramInterval::Day)?;
        let link = self.find_link(ending).await?;

        let locations = self
            .click_repository
            .geography(link.id, window.start, window.end, level)
            .await?;

        Ok(ClickGeography {
            link,
            window,
            level,
            locations,
        })
    }

    async fn find_link(&self, ending: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_ending(&canonical_ending(ending))
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "ending": ending })))
    }
}

fn resolve_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    interval: HistogramInterval,
) -> Result<StatsWindow, AppError> {
    let end = end.unwrap_or_else(Utc::now);
    let start =
        start.unwrap_or_else(|| interval.truncate(end - Duration::days(DEFAULT_WINDOW_DAYS)));

    if start >= end {
        return Err(AppError::bad_request(
            "Start time must be before end time",
            json!({ "start_time": start, "end_time": end }),
        ));
    }

    Ok(StatsWindow { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use chrono::TimeZone;
    use mockall::predicate::*;
    use std::collections::BTreeSet;

    fn create_test_link(id: i64, ending: &str) -> Link {
        let now = Utc::now();
        Link::new(
            id,
            ending.to_string(),
            "https://example.com".to_string(),
            now,
            now,
            BTreeSet::new(),
        )
    }

    fn service(
        links: MockLinkRepository,
        clicks: MockClickRepository,
    ) -> StatsService<MockLinkRepository, MockClickRepository> {
        StatsService::new(Arc::new(links), Arc::new(clicks))
    }

    fn links_with(ending: &'static str, id: i64) -> MockLinkRepository {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_ending()
            .withf(move |e| e == ending)
            .returning(move |e| Ok(Some(create_test_link(id, e))));
        links
    }

    #[tokio::test]
    async fn test_histogram_queries_link_window() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_histogram()
            .with(eq(7), eq(start), eq(end), eq(HistogramInterval::Hour))
            .times(1)
            .returning(move |_, s, _, _| Ok(vec![HistogramBucket { start: s, count: 4 }]));

        let histogram = service(links_with("DOCS", 7), clicks)
            .histogram("docs", Some(start), Some(end), HistogramInterval::Hour)
            .await
            .unwrap();

        assert_eq!(histogram.link.ending, "DOCS");
        assert_eq!(histogram.window, StatsWindow { start, end });
        assert_eq!(histogram.buckets.len(), 1);
        assert_eq!(histogram.buckets[0].count, 4);
    }

    #[tokio::test]
    async fn test_default_window_is_thirty_days_to_bucket_boundary() {
        let end = Utc.with_ymd_and_hms(2025, 3, 31, 15, 45, 0).unwrap();

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_histogram()
            .withf(|_, start, _, _| *start == Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let histogram = service(links_with("DOCS", 7), clicks)
            .histogram("DOCS", None, Some(end), HistogramInterval::Month)
            .await
            .unwrap();

        assert_eq!(histogram.window.end, end);
        assert!(histogram.buckets.is_empty());
    }

    #[tokio::test]
    async fn test_geography_passes_level() {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_geography()
            .withf(|id, _, _, level| *id == 3 && *level == LocationLevel::Region)
            .times(1)
            .returning(|_, _, _, _| {
                Ok(vec![LocationCount {
                    code: "BE".to_string(),
                    name: Some("Berlin".to_string()),
                    count: 2,
                }])
            });

        let geography = service(links_with("PROMO", 3), clicks)
            .geography("promo", None, None, LocationLevel::Region)
            .await
            .unwrap();

        assert_eq!(geography.locations[0].code, "BE");
        assert!(geography.window.start < geography.window.end);
    }

    #[tokio::test]
    async fn test_unknown_ending_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_ending().returning(|_| Ok(None));

        let result = service(links, MockClickRepository::new())
            .histogram("NOPE7", None, None, HistogramInterval::Day)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_window_rejected() {
        let now = Utc::now();
        let mut links = MockLinkRepository::new();
        links.expect_find_by_ending().times(0);

        let result = service(links, MockClickRepository::new())
            .geography("DOCS", Some(now), Some(now), LocationLevel::Country)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
