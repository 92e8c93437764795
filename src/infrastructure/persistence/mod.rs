//! Repository implementations.
//!
//! Concrete implementations of the domain repository traits: PostgreSQL via
//! SQLx runtime queries, and an in-memory store for development and tests.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Links and tags
//! - [`PgEndingPoolRepository`] - Pending endings with atomic claims
//! - [`PgClickRepository`] - Recorded visits
//! - [`InMemoryStore`] - All three traits in one process

pub mod in_memory;
pub mod pg_click_repository;
pub mod pg_ending_pool_repository;
pub mod pg_link_repository;

pub use in_memory::InMemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_ending_pool_repository::PgEndingPoolRepository;
pub use pg_link_repository::PgLinkRepository;
