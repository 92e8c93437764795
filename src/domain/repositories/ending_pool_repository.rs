//! Repository trait for the pool of pre-generated endings.

use crate::domain::entities::PendingEnding;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for pending, unassigned endings.
///
/// The pool is shared by every concurrent allocation. [`Self::claim`] is the
/// only way rows leave it for allocation and must be atomic: two concurrent
/// claims never return the same ending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndingPoolRepository: Send + Sync {
    /// Adds endings to the pool, skipping any already present.
    ///
    /// Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, endings: Vec<PendingEnding>) -> Result<u64, AppError>;

    /// Atomically removes and returns up to `limit` endings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn claim(&self, limit: usize) -> Result<Vec<String>, AppError>;

    /// Removes the given endings from the pool, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_by_endings(&self, endings: &[String]) -> Result<u64, AppError>;

    /// Returns the subset of `endings` currently in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn existing_endings(&self, endings: &[String]) -> Result<Vec<String>, AppError>;

    /// Counts pooled endings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
