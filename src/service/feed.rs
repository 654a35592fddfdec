//! Feed service
//!
//! Post listings for the index page and the tag cloud.

use std::sync::Arc;

use super::tags::normalize_tag;
use crate::data::{Database, FeedFilter, FeedSort, PostSummary, TagCount, UserRef};
use crate::error::AppError;

/// Listing options taken from the index query string
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    /// Only the viewer's posts and those of accounts they follow
    pub feed: bool,
    pub tag: Option<String>,
    pub sort: FeedSort,
}

/// Feed service
pub struct FeedService {
    db: Arc<Database>,
}

impl FeedService {
    /// Create new feed service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List posts for the index page
    ///
    /// Anonymous viewers, and viewers not asking for their feed, see public
    /// posts only. The subscription feed lists the viewer's own posts and
    /// posts by followed authors of any visibility; only titles reach the
    /// listing and the post page still enforces access.
    pub async fn list(
        &self,
        query: &FeedQuery,
        viewer: Option<&UserRef>,
    ) -> Result<Vec<PostSummary>, AppError> {
        let filter = FeedFilter {
            subscriber_id: viewer.filter(|_| query.feed).map(|user| user.id),
            tag: query.tag.as_deref().and_then(normalize_tag),
            sort: query.sort,
        };
        self.db.list_posts(&filter).await
    }

    /// Tags in use with their post counts
    pub async fn tags(&self) -> Result<Vec<TagCount>, AppError> {
        self.db.list_tags().await
    }
}
