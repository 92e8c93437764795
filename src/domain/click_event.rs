//! Visit event model for asynchronous click attribution.

use chrono::{DateTime, Utc};

/// What the request layer knows about a visitor.
///
/// Holds the raw, identifying values; they are anonymized by
/// [`crate::application::services::ClickService`] before anything is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitContext {
    pub ip: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub do_not_track: bool,
}

/// An in-memory representation of a visit for async processing.
///
/// Created by the redirect handler, sent through a bounded channel and turned
/// into a stored click by [`crate::domain::click_worker::run_click_worker`],
/// so the redirect never waits on geolocation or the database.
///
/// The visit time is captured on creation, not when the worker gets to it.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitEvent {
    pub link_id: i64,
    pub ending: String,
    pub target_url: String,
    pub visited_at: DateTime<Utc>,
    pub context: VisitContext,
}

impl VisitEvent {
    /// Creates a visit event timestamped now.
    pub fn new(link_id: i64, ending: String, target_url: String, context: VisitContext) -> Self {
        Self {
            link_id,
            ending,
            target_url,
            visited_at: Utc::now(),
            context,
        }
    }
}
