//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for stored short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - single-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts links and their tags as one unit.
    ///
    /// The inserted endings are removed from the ending pool in the same unit,
    /// so an ending is never both pooled and assigned. Either every link is
    /// stored or none is.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if any ending is already taken. This is
    /// the authoritative signal that a concurrent request claimed it first.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError>;

    /// Finds a link by its canonical ending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_ending(&self, ending: &str) -> Result<Option<Link>, AppError>;

    /// Returns the subset of `endings` already used by stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn existing_endings(&self, endings: &[String]) -> Result<Vec<String>, AppError>;

    /// Deletes links by ending, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_by_endings(&self, endings: &[String]) -> Result<u64, AppError>;

    /// Counts stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
