//! Data models
//!
//! Rust structs representing database rows and write inputs.
//! All models use SQLite integer ids and chrono timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Users
// =============================================================================

/// A registered user, including the stored password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Public identity of a user (what pages and sessions need)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

// =============================================================================
// Posts
// =============================================================================

/// A single post joined with its author's username
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    /// Author id
    pub user_id: i64,
    /// Author username
    pub username: String,
    pub title: String,
    pub content: String,
    /// true = visible to everyone, false = author and requesters only
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

/// Listing row used by the index, feed and profile pages
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub title: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub comments_count: i64,
    /// Filled in after the listing query
    #[sqlx(skip)]
    pub tags: Vec<String>,
}

/// Input for creating or replacing a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub public: bool,
    /// Already normalized tag names
    pub tags: Vec<String>,
}

// =============================================================================
// Tags
// =============================================================================

/// Tag name with the number of posts linked to it
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

// =============================================================================
// Comments
// =============================================================================

/// Comment joined with its author's username
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Access requests
// =============================================================================

/// Access request together with the author of the requested post
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessRequest {
    pub id: i64,
    pub post_id: i64,
    /// Requester
    pub user_id: i64,
    /// Author of the requested post
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Request on one of the author's posts, as shown on `/my_requests`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IncomingRequest {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub requester_name: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Listing filters
// =============================================================================

/// Ordering of post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSort {
    /// Newest first
    #[default]
    Recent,
    /// Most commented first, then newest
    Popular,
}

impl FeedSort {
    /// Parse the `sort` query value. Unknown values fall back to `Recent`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("popular") => Self::Popular,
            _ => Self::Recent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Popular => "popular",
        }
    }
}

/// Filter for post listings
#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// When set, list this user's posts and those of accounts they follow,
    /// regardless of visibility. When unset, list public posts only.
    pub subscriber_id: Option<i64>,
    /// Only posts carrying this tag name
    pub tag: Option<String>,
    pub sort: FeedSort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_sort_parses_popular_and_defaults_to_recent() {
        assert_eq!(FeedSort::parse(Some("popular")), FeedSort::Popular);
        assert_eq!(FeedSort::parse(Some("recent")), FeedSort::Recent);
        assert_eq!(FeedSort::parse(Some("bogus")), FeedSort::Recent);
        assert_eq!(FeedSort::parse(None), FeedSort::Recent);
    }
}
