//! Link creation and resolution service.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::EndingPoolService;
use crate::domain::entities::{Link, NewLink, canonical_ending};
use crate::domain::errors::AllocationError;
use crate::domain::repositories::{EndingPoolRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::symbol_codec::normalize_confusables;

/// Insert attempts before a run of lost races is reported.
const MAX_INSERT_ATTEMPTS: usize = 3;

/// One link to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortenItem {
    pub target_url: String,
    /// Manually chosen ending; `None` allocates one from the pool.
    pub ending: Option<String>,
    pub tags: Vec<String>,
}

impl ShortenItem {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }

    pub fn with_ending(mut self, ending: impl Into<String>) -> Self {
        self.ending = Some(ending.into());
        self
    }

    pub fn with_tags<I: IntoIterator<Item = String>>(mut self, tags: I) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }
}

/// Service for creating short links and resolving endings.
///
/// Manual endings are reserved up front; every other ending comes from the
/// allocation pool. Whichever request inserts an ending first wins: a
/// uniqueness conflict on insert means a concurrent request took it.
pub struct LinkService<L, P>
where
    L: LinkRepository + ?Sized,
    P: EndingPoolRepository + ?Sized + 'static,
{
    link_repository: Arc<L>,
    ending_pool: Arc<EndingPoolService<L, P>>,
    base_url: String,
}

impl<L, P> LinkService<L, P>
where
    L: LinkRepository + ?Sized,
    P: EndingPoolRepository + ?Sized + 'static,
{
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        ending_pool: Arc<EndingPoolService<L, P>>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            link_repository,
            ending_pool,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The pool manager backing allocation.
    pub fn ending_pool(&self) -> &EndingPoolService<L, P> {
        &self.ending_pool
    }

    /// Creates a single short link.
    ///
    /// # Errors
    ///
    /// See [`Self::shorten_batch`].
    pub async fn shorten(&self, item: ShortenItem) -> Result<Link, AppError> {
        let mut links = self.shorten_batch(vec![item]).await?;
        links.pop().ok_or_else(|| {
            AppError::internal("Link insert returned nothing", json!({}))
        })
    }

    /// Creates short links as one unit, in request order.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if a manual ending is repeated
    /// - [`AppError::Conflict`] if a manual ending is taken, or generated
    ///   endings kept colliding
    /// - [`AppError::Internal`] if the pool is exhausted or on store errors
    pub async fn shorten_batch(&self, items: Vec<ShortenItem>) -> Result<Vec<Link>, AppError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let manual: Vec<String> = items.iter().filter_map(|i| i.ending.clone()).collect();
        let reserved = self.ending_pool.reserve_manual_batch(&manual).await?;
        let generated_count = items.len() - manual.len();

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let generated = self.ending_pool.allocate(generated_count).await?;
            let new_links = assemble(&items, &reserved, generated.clone());

            match self.ending_pool.insert(new_links).await {
                Ok(links) => {
                    debug!(count = links.len(), attempt, "Created short links");
                    return Ok(links);
                }
                Err(e) if e.is_conflict() => {
                    self.release_untaken(generated).await?;
                    self.check_manual_endings(&manual, &reserved).await?;
                    warn!(attempt, "Generated ending collided, retrying");
                    metrics::counter!("link_insert_conflicts_total").increment(1);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            "Could not store links with unique endings",
            json!({ "attempts": MAX_INSERT_ATTEMPTS }),
        ))
    }

    /// Finds the link for an ending as typed by a visitor.
    ///
    /// Falls back to a lookup with confusable symbols replaced and hyphens
    /// removed, so `H0ME-1` finds `HOMEI`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if neither lookup matches.
    pub async fn resolve(&self, ending: &str) -> Result<Link, AppError> {
        let exact = canonical_ending(ending);
        if let Some(link) = self.link_repository.find_by_ending(&exact).await? {
            return Ok(link);
        }

        let normalized = normalize_confusables(&exact);
        if normalized != exact
            && !normalized.is_empty()
            && let Some(link) = self.link_repository.find_by_ending(&normalized).await?
        {
            debug!(requested = %exact, resolved = %normalized, "Resolved confusable ending");
            return Ok(link);
        }

        Err(AppError::not_found(
            "Short link not found",
            json!({ "ending": ending }),
        ))
    }

    /// Full short URL for an ending.
    pub fn short_url(&self, ending: &str) -> String {
        format!("{}/{}", self.base_url, ending)
    }

    /// Returns generated endings that no link took back to the pool.
    async fn release_untaken(&self, generated: Vec<String>) -> Result<(), AppError> {
        if generated.is_empty() {
            return Ok(());
        }

        let taken: HashSet<String> = self
            .link_repository
            .existing_endings(&generated)
            .await?
            .into_iter()
            .collect();
        let untaken: Vec<String> = generated
            .into_iter()
            .filter(|e| !taken.contains(e))
            .collect();

        debug!(released = untaken.len(), "Returning unused endings after conflict");
        self.ending_pool.release(untaken).await;
        Ok(())
    }

    async fn check_manual_endings(
        &self,
        manual: &[String],
        reserved: &[String],
    ) -> Result<(), AppError> {
        if reserved.is_empty() {
            return Ok(());
        }

        let taken = self.link_repository.existing_endings(reserved).await?;
        if let Some((original, _)) = manual
            .iter()
            .zip(reserved)
            .find(|(_, canonical)| taken.contains(canonical))
        {
            return Err(AllocationError::EndingAlreadyExists {
                ending: original.trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Pairs items with their endings: manual ones in order, generated ones for
/// the rest.
fn assemble(items: &[ShortenItem], reserved: &[String], generated: Vec<String>) -> Vec<NewLink> {
    let mut reserved = reserved.iter();
    let mut generated = generated.into_iter();

    items
        .iter()
        .filter_map(|item| {
            let ending = match item.ending {
                Some(_) => reserved.next().cloned(),
                None => generated.next(),
            }?;
            Some(NewLink::new(
                &ending,
                item.target_url.clone(),
                item.tags.iter().cloned(),
            ))
        })
        .collect()
}
