//! DTOs for link shortening endpoints.

use crate::application::services::ShortenItem;
use crate::domain::entities::Link;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for manually chosen endings.
static ENDING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$").unwrap());

/// Request to shorten a single URL.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to redirect to (must be a valid absolute URL).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional manual ending; compared case-insensitively.
    #[validate(length(min = 2, max = 64))]
    #[validate(regex(path = *ENDING_REGEX, message = "Ending may only contain letters, digits and hyphens"))]
    pub ending: Option<String>,

    #[serde(default)]
    #[validate(length(max = 32))]
    pub tags: Vec<String>,
}

impl From<ShortenRequest> for ShortenItem {
    fn from(request: ShortenRequest) -> Self {
        ShortenItem {
            target_url: request.url,
            ending: request.ending,
            tags: request
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// Request to shorten several URLs as one unit.
///
/// Either every link is created or none is.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenBatchRequest {
    #[validate(length(min = 1, max = 1000))]
    #[validate(nested)]
    pub items: Vec<ShortenRequest>,
}

/// A created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    pub url: String,
    pub ending: String,
    pub short_url: String,
    pub tags: Vec<String>,
    pub creation_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

impl ShortLinkResponse {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            url: link.target_url,
            ending: link.ending,
            short_url,
            tags: link.tags.into_iter().collect(),
            creation_time: link.created_at,
            last_modified_time: link.last_modified_at,
        }
    }
}

/// Links created by a batch request, in request order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenBatchResponse {
    pub items: Vec<ShortLinkResponse>,
}
