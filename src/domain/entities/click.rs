//! Click entity representing a single redirect visit.

use chrono::{DateTime, Utc};

/// A latitude/longitude pair; either both are known or neither is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Coarse geography attributed to a visit. Unknown parts are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geography {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    pub postal_code: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// A recorded visit to a short link.
///
/// Never mutated after insertion. `link_id` refers to the link without owning
/// it; `ending` and `target_url` are snapshots taken at visit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub ending: String,
    pub target_url: String,
    pub clicked_at: DateTime<Utc>,
    pub geography: Geography,
    pub referrer_url: Option<String>,
    pub identifying_hash: Option<String>,
}

/// Input data for recording a click.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: i64,
    pub ending: String,
    pub target_url: String,
    pub clicked_at: DateTime<Utc>,
    pub geography: Geography,
    pub referrer_url: Option<String>,
    pub identifying_hash: Option<String>,
}

impl NewClick {
    /// Attaches a store-assigned identifier.
    pub fn into_click(self, id: i64) -> Click {
        Click {
            id,
            link_id: self.link_id,
            ending: self.ending,
            target_url: self.target_url,
            clicked_at: self.clicked_at,
            geography: self.geography,
            referrer_url: self.referrer_url,
            identifying_hash: self.identifying_hash,
        }
    }
}
