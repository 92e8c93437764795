//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// A stored short link.
///
/// `ending` is kept in canonical form (see [`canonical_ending`]) and is unique
/// across all links.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub ending: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub tags: BTreeSet<String>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        ending: String,
        target_url: String,
        created_at: DateTime<Utc>,
        last_modified_at: DateTime<Utc>,
        tags: BTreeSet<String>,
    ) -> Self {
        Self {
            id,
            ending,
            target_url,
            created_at,
            last_modified_at,
            tags,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub ending: String,
    pub target_url: String,
    pub tags: BTreeSet<String>,
}

impl NewLink {
    /// Builds a new link, canonicalizing the ending and deduplicating tags.
    pub fn new<I>(ending: &str, target_url: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            ending: canonical_ending(ending),
            target_url: target_url.into(),
            tags: tags.into_iter().collect(),
        }
    }
}

/// Canonical form of an ending: surrounding whitespace removed, ASCII upper case.
///
/// Endings compare case-insensitively; storing them canonicalized lets the
/// store's uniqueness constraint enforce that.
pub fn canonical_ending(ending: &str) -> String {
    ending.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            1,
            "H7KD9X2A".to_string(),
            "https://example.com".to_string(),
            now,
            now,
            BTreeSet::new(),
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.ending, "H7KD9X2A");
        assert_eq!(link.target_url, "https://example.com");
        assert_eq!(link.created_at, now);
        assert!(link.tags.is_empty());
    }

    #[test]
    fn test_new_link_canonicalizes_ending() {
        let new_link = NewLink::new(" my-Link ", "https://rust-lang.org", Vec::new());
        assert_eq!(new_link.ending, "MY-LINK");
    }

    #[test]
    fn test_new_link_deduplicates_tags() {
        let new_link = NewLink::new(
            "abc",
            "https://rust-lang.org",
            vec!["docs".to_string(), "rust".to_string(), "docs".to_string()],
        );

        assert_eq!(new_link.tags.len(), 2);
        assert!(new_link.tags.contains("docs"));
        assert!(new_link.tags.contains("rust"));
    }
}
