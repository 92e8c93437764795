//! An ending waiting in the allocation pool.

use chrono::{DateTime, Utc};

/// A generated, vetted ending that has not been handed out yet.
///
/// Rows exist only until the ending is claimed by an allocation or a manual
/// reservation; pool order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEnding {
    pub ending: String,
    pub created_at: DateTime<Utc>,
}

impl PendingEnding {
    /// Wraps a freshly generated ending, timestamped now.
    pub fn new(ending: String) -> Self {
        Self {
            ending,
            created_at: Utc::now(),
        }
    }
}
