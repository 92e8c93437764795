//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the three stores the allocation engine and click
//! pipeline depend on. Implementations live in `crate::infrastructure::persistence`.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short links and their tags
//! - [`EndingPoolRepository`] - Pre-generated endings awaiting allocation
//! - [`ClickRepository`] - Recorded visits
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod click_repository;
pub mod ending_pool_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use ending_pool_repository::EndingPoolRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use ending_pool_repository::MockEndingPoolRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
