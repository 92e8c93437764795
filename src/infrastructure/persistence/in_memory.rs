//! Single-process implementation of every store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::{
    Click, HistogramBucket, HistogramInterval, Link, LocationCount, LocationLevel, NewClick,
    NewLink, PendingEnding,
};
use crate::domain::repositories::{ClickRepository, EndingPoolRepository, LinkRepository};
use crate::error::AppError;

#[derive(Default)]
struct Tables {
    links: BTreeMap<String, Link>,
    next_link_id: i64,
    pending: BTreeMap<String, DateTime<Utc>>,
    clicks: Vec<Click>,
}

/// Links, the ending pool and clicks kept behind one mutex.
///
/// Every operation runs under the lock, which gives it the same atomicity as
/// the PostgreSQL transactions: claims never overlap and a link insert either
/// lands completely or not at all. Used for local development and tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded click, oldest first.
    pub fn clicks(&self) -> Vec<Click> {
        self.lock().clicks.clone()
    }

    /// Snapshot of the pooled endings.
    pub fn pending_endings(&self) -> Vec<String> {
        self.lock().pending.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn insert(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError> {
        let mut tables = self.lock();

        let mut batch = HashSet::with_capacity(new_links.len());
        for new_link in &new_links {
            if tables.links.contains_key(&new_link.ending) || !batch.insert(&new_link.ending) {
                return Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "ending": new_link.ending }),
                ));
            }
        }

        let now = Utc::now();
        let mut links = Vec::with_capacity(new_links.len());
        for new_link in new_links {
            tables.next_link_id += 1;
            let link = Link::new(
                tables.next_link_id,
                new_link.ending,
                new_link.target_url,
                now,
                now,
                new_link.tags,
            );
            tables.pending.remove(&link.ending);
            tables.links.insert(link.ending.clone(), link.clone());
            links.push(link);
        }

        Ok(links)
    }

    async fn find_by_ending(&self, ending: &str) -> Result<Option<Link>, AppError> {
        Ok(self.lock().links.get(ending).cloned())
    }

    async fn existing_endings(&self, endings: &[String]) -> Result<Vec<String>, AppError> {
        let tables = self.lock();
        Ok(endings
            .iter()
            .filter(|e| tables.links.contains_key(*e))
            .cloned()
            .collect())
    }

    async fn delete_by_endings(&self, endings: &[String]) -> Result<u64, AppError> {
        let mut tables = self.lock();
        let removed = endings
            .iter()
            .filter(|e| tables.links.remove(*e).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock().links.len() as i64)
    }
}

#[async_trait]
impl EndingPoolRepository for InMemoryStore {
    async fn insert(&self, endings: Vec<PendingEnding>) -> Result<u64, AppError> {
        let mut tables = self.lock();
        let mut inserted = 0;

        for pending in endings {
            if tables.links.contains_key(&pending.ending)
                || tables.pending.contains_key(&pending.ending)
            {
                continue;
            }
            tables.pending.insert(pending.ending, pending.created_at);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn claim(&self, limit: usize) -> Result<Vec<String>, AppError> {
        let mut tables = self.lock();
        let claimed: Vec<String> = tables.pending.keys().take(limit).cloned().collect();
        for ending in &claimed {
            tables.pending.remove(ending);
        }
        Ok(claimed)
    }

    async fn delete_by_endings(&self, endings: &[String]) -> Result<u64, AppError> {
        let mut tables = self.lock();
        let removed = endings
            .iter()
            .filter(|e| tables.pending.remove(*e).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn existing_endings(&self, endings: &[String]) -> Result<Vec<String>, AppError> {
        let tables = self.lock();
        Ok(endings
            .iter()
            .filter(|e| tables.pending.contains_key(*e))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock().pending.len() as i64)
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut tables = self.lock();

        if !tables.links.values().any(|l| l.id == new_click.link_id) {
            return Err(AppError::internal(
                "Click references an unknown link",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        let click = new_click.into_click(tables.clicks.len() as i64 + 1);
        tables.clicks.push(click.clone());
        Ok(click)
    }

    async fn histogram(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: HistogramInterval,
    ) -> Result<Vec<HistogramBucket>, AppError> {
        let mut buckets: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
        for click in self.lock().clicks.iter() {
            if click.link_id == link_id && click.clicked_at >= start && click.clicked_at < end {
                *buckets.entry(interval.truncate(click.clicked_at)).or_default() += 1;
            }
        }

        Ok(buckets
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
        let mut places: BTreeMap<(String, Option<String>), i64> = BTreeMap::new();
        for click in self.lock().clicks.iter() {
            if click.link_id != link_id || click.clicked_at < start || click.clicked_at >= end {
                continue;
            }
            let geo = &click.geography;
            let place = match level {
                LocationLevel::Country => (geo.country_code.clone(), geo.country_name.clone()),
                LocationLevel::Region => (geo.region_code.clone(), geo.region_name.clone()),
                LocationLevel::PostalCode => (geo.postal_code.clone(), None),
            };
            if let (Some(code), name) = place {
                *places.entry((code, name)).or_default() += 1;
            }
        }

        let mut locations: Vec<LocationCount> = places
            .into_iter()
            .map(|((code, name), count)| LocationCount { code, name, count })
            .collect();
        locations.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
        Ok(locations)
    }
}
