//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A short link: ending, target URL and tags
//! - [`PendingEnding`] - A vetted ending waiting in the allocation pool
//! - [`Click`] - One recorded redirect visit
//! - [`HistogramBucket`], [`LocationCount`] - Click aggregates for statistics
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! (`NewLink`, `NewClick`), since identifiers and timestamps are assigned by
//! the store.

pub mod click;
pub mod click_stats;
pub mod link;
pub mod pending_ending;

pub use click::{Click, Coordinates, Geography, NewClick};
pub use click_stats::{HistogramBucket, HistogramInterval, LocationCount, LocationLevel};
pub use link::{Link, NewLink, canonical_ending};
pub use pending_ending::PendingEnding;
