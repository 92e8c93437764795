//! Allocation pool manager for link endings.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, NewLink, PendingEnding, canonical_ending};
use crate::domain::errors::AllocationError;
use crate::domain::repositories::{EndingPoolRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::ending_generator::EndingGenerator;

/// Smallest batch generated when the pool runs dry.
const MIN_GENERATION_BATCH: usize = 100;

/// Generation rounds attempted before giving up on a request.
const MAX_GENERATION_ROUNDS: usize = 8;

/// Hands out unique endings and resolves manual reservations.
///
/// # Allocation
///
/// Endings come from the persisted pool first; a single atomic claim removes
/// them so no two callers can receive the same one. Any shortfall is generated
/// on the spot, checked against both stores, and the unused part of the
/// generated batch is written back to the pool in a detached task.
///
/// The store's uniqueness constraint on links stays the final arbiter: callers
/// insert through [`Self::insert`] and treat a conflict as a lost race.
pub struct EndingPoolService<L, P>
where
    L: LinkRepository + ?Sized,
    P: EndingPoolRepository + ?Sized + 'static,
{
    link_repository: Arc<L>,
    pool_repository: Arc<P>,
    generator: EndingGenerator,
}

impl<L, P> EndingPoolService<L, P>
where
    L: LinkRepository + ?Sized,
    P: EndingPoolRepository + ?Sized + 'static,
{
    /// Creates a new pool service.
    pub fn new(link_repository: Arc<L>, pool_repository: Arc<P>, generator: EndingGenerator) -> Self {
        Self {
            link_repository,
            pool_repository,
            generator,
        }
    }

    /// The generator used for fresh endings.
    pub fn generator(&self) -> &EndingGenerator {
        &self.generator
    }

    /// Returns up to `count` endings that are in neither store.
    ///
    /// A result shorter than `count` means generation ran out of attempts; it
    /// is not an error here (see [`Self::allocate`]).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn fetch(&self, count: usize) -> Result<Vec<String>, AppError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut endings = self.pool_repository.claim(count).await?;
        metrics::counter!("ending_pool_claimed_total").increment(endings.len() as u64);

        if endings.len() >= count {
            debug!(count, "Served endings from pool");
            return Ok(endings);
        }

        let shortfall = count - endings.len();
        let batch_size = count.max(MIN_GENERATION_BATCH);
        let mut seen: HashSet<String> = endings.iter().cloned().collect();
        let mut fresh = Vec::with_capacity(batch_size);

        for round in 0..MAX_GENERATION_ROUNDS {
            if fresh.len() >= shortfall {
                break;
            }

            let accepted = self.fresh_candidates(batch_size, &mut seen).await?;
            debug!(round, accepted = accepted.len(), "Generated endings");
            fresh.extend(accepted);
        }

        let surplus = if fresh.len() > shortfall {
            fresh.split_off(shortfall)
        } else {
            Vec::new()
        };

        metrics::counter!("ending_pool_generated_total").increment(fresh.len() as u64);
        endings.extend(fresh);

        if endings.len() < count {
            warn!(
                requested = count,
                allocated = endings.len(),
                "Ending generation exhausted its attempt budget"
            );
        }

        self.persist_surplus(surplus);

        Ok(endings)
    }

    /// Like [`Self::fetch`], but fails unless exactly `count` endings are found.
    ///
    /// Claimed endings are returned to the pool on failure.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Exhausted`] on a short result and
    /// [`AllocationError::Store`] on store errors.
    pub async fn allocate(&self, count: usize) -> Result<Vec<String>, AllocationError> {
        let endings = self.fetch(count).await?;

        if endings.len() < count {
            let allocated = endings.len();
            self.release(endings).await;
            return Err(AllocationError::Exhausted {
                requested: count,
                allocated,
            });
        }

        Ok(endings)
    }

    /// Reserves one manually chosen ending.
    ///
    /// # Errors
    ///
    /// See [`Self::reserve_manual_batch`].
    pub async fn reserve_manual(&self, ending: &str) -> Result<String, AllocationError> {
        let mut reserved = self.reserve_manual_batch(&[ending.to_string()]).await?;
        reserved.pop().ok_or_else(|| {
            AllocationError::Store(AppError::internal(
                "Manual reservation returned nothing",
                json!({ "ending": ending }),
            ))
        })
    }

    /// Reserves manually chosen endings, returning them in canonical form.
    ///
    /// Comparison is case-insensitive. Matching pool rows are removed so the
    /// endings cannot be handed out by a concurrent allocation.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::DuplicateInRequest`] if an ending is repeated
    /// - [`AllocationError::EndingAlreadyExists`] if a link already uses one,
    ///   carrying the value as the caller spelled it
    /// - [`AllocationError::Store`] on store errors
    pub async fn reserve_manual_batch(
        &self,
        endings: &[String],
    ) -> Result<Vec<String>, AllocationError> {
        let mut canonical = Vec::with_capacity(endings.len());
        let mut seen = HashSet::with_capacity(endings.len());

        for ending in endings {
            let value = canonical_ending(ending);
            if !seen.insert(value.clone()) {
                return Err(AllocationError::DuplicateInRequest {
                    ending: ending.clone(),
                });
            }
            canonical.push(value);
        }

        if canonical.is_empty() {
            return Ok(canonical);
        }

        let taken = self.link_repository.existing_endings(&canonical).await?;
        if let Some(original) = first_taken(endings, &canonical, &taken) {
            return Err(AllocationError::EndingAlreadyExists { ending: original });
        }

        let removed = self.pool_repository.delete_by_endings(&canonical).await?;
        if removed > 0 {
            debug!(removed, "Removed manually reserved endings from pool");
        }

        Ok(canonical)
    }

    /// Persists links and their tags as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if an ending was taken concurrently and
    /// [`AppError::Internal`] on store errors.
    pub async fn insert(&self, links: Vec<NewLink>) -> Result<Vec<Link>, AppError> {
        self.link_repository.insert(links).await
    }

    /// Generates and stores `count` fresh endings in the pool.
    ///
    /// Returns the number of endings added.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn refill(&self, count: usize) -> Result<u64, AppError> {
        let mut seen = HashSet::with_capacity(count);
        let mut fresh = Vec::with_capacity(count);

        for _ in 0..MAX_GENERATION_ROUNDS {
            if fresh.len() >= count {
                break;
            }
            let accepted = self
                .fresh_candidates(count - fresh.len(), &mut seen)
                .await?;
            fresh.extend(accepted);
        }

        fresh.truncate(count);
        let inserted = self
            .pool_repository
            .insert(fresh.into_iter().map(PendingEnding::new).collect())
            .await?;

        info!(requested = count, inserted, "Refilled ending pool");
        Ok(inserted)
    }

    /// Number of endings waiting in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn pool_size(&self) -> Result<i64, AppError> {
        self.pool_repository.count().await
    }

    /// Generates one batch and keeps the candidates unknown to both stores.
    async fn fresh_candidates(
        &self,
        batch_size: usize,
        seen: &mut HashSet<String>,
    ) -> Result<Vec<String>, AppError> {
        let candidates: Vec<String> = self
            .generator
            .candidates(batch_size)
            .into_iter()
            .filter(|c| !seen.contains(c))
            .collect();

        if candidates.is_empty() {
            return Ok(candidates);
        }

        let mut taken: HashSet<String> = self
            .link_repository
            .existing_endings(&candidates)
            .await?
            .into_iter()
            .collect();
        taken.extend(self.pool_repository.existing_endings(&candidates).await?);

        let accepted: Vec<String> = candidates
            .into_iter()
            .filter(|c| !taken.contains(c))
            .collect();
        seen.extend(accepted.iter().cloned());

        Ok(accepted)
    }

    fn persist_surplus(&self, surplus: Vec<String>) {
        if surplus.is_empty() {
            return;
        }

        let pool_repository = Arc::clone(&self.pool_repository);
        tokio::spawn(async move {
            let count = surplus.len();
            let rows = surplus.into_iter().map(PendingEnding::new).collect();
            match pool_repository.insert(rows).await {
                Ok(inserted) => debug!(count, inserted, "Stored surplus endings"),
                Err(e) => warn!(count, "Failed to store surplus endings: {}", e),
            }
        });
    }

    /// Returns unused endings to the pool. Failures are logged, not raised.
    pub(crate) async fn release(&self, endings: Vec<String>) {
        if endings.is_empty() {
            return;
        }

        let rows = endings.into_iter().map(PendingEnding::new).collect();
        if let Err(e) = self.pool_repository.insert(rows).await {
            warn!("Failed to return endings to pool: {}", e);
        }
    }
}

fn first_taken(originals: &[String], canonical: &[String], taken: &[String]) -> Option<String> {
    if taken.is_empty() {
        return None;
    }
    let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
    originals
        .iter()
        .zip(canonical)
        .find(|(_, c)| taken.contains(c.as_str()))
        .map(|(original, _)| original.trim().to_string())
}
