//! Post service
//!
//! Authoring, viewing and commenting on posts.

use std::sync::Arc;

use super::access::AccessService;
use super::tags::normalize_tags;
use crate::data::{Comment, Database, Post, PostDraft, UserRef};
use crate::error::AppError;
use crate::metrics::POSTS_TOTAL;

/// Build a draft from raw form input
///
/// Title and content are trimmed and tags normalized. Both may end up empty.
pub fn build_draft(title: &str, content: &str, public: bool, tags: &str) -> PostDraft {
    PostDraft {
        title: title.trim().to_string(),
        content: content.trim().to_string(),
        public,
        tags: normalize_tags(tags),
    }
}

/// Everything the post page shows
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub tags: Vec<String>,
    /// Empty unless `can_view`
    pub comments: Vec<Comment>,
    pub can_view: bool,
    /// Viewer follows the author
    pub is_following: bool,
    /// Viewer has an access request row for this post
    pub has_requested: bool,
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Publish a new post
    ///
    /// # Returns
    /// The new post id
    pub async fn create(&self, author: &UserRef, draft: &PostDraft) -> Result<i64, AppError> {
        let post_id = self.db.insert_post(author.id, draft).await?;
        POSTS_TOTAL.inc();

        tracing::info!(
            post_id,
            author = %author.username,
            public = draft.public,
            tags = draft.tags.len(),
            "Post created"
        );

        Ok(post_id)
    }

    /// Load a post for editing
    ///
    /// # Returns
    /// The post and its current tag names
    ///
    /// # Errors
    /// `Forbidden` if the post is missing or `editor_id` is not its author
    pub async fn editable(
        &self,
        post_id: i64,
        editor_id: i64,
    ) -> Result<(Post, Vec<String>), AppError> {
        let post = self
            .db
            .get_post(post_id)
            .await?
            .filter(|post| post.user_id == editor_id)
            .ok_or(AppError::Forbidden)?;
        let tags = self.db.get_post_tags(post.id).await?;
        Ok((post, tags))
    }

    /// Replace a post's fields and tags
    ///
    /// # Errors
    /// `Forbidden` if the post is missing or `editor_id` is not its author
    pub async fn update(
        &self,
        post_id: i64,
        editor_id: i64,
        draft: &PostDraft,
    ) -> Result<(), AppError> {
        self.editable(post_id, editor_id).await?;
        self.db.update_post(post_id, draft).await?;

        tracing::info!(post_id, public = draft.public, "Post updated");
        Ok(())
    }

    /// Delete a post with its comments, tag links and access requests
    ///
    /// # Errors
    /// `Forbidden` if the post is missing or `editor_id` is not its author
    pub async fn delete(&self, post_id: i64, editor_id: i64) -> Result<(), AppError> {
        self.editable(post_id, editor_id).await?;
        self.db.delete_post(post_id).await?;
        POSTS_TOTAL.dec();

        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    /// Assemble the post page for a viewer
    ///
    /// # Errors
    /// `NotFound` if the post does not exist
    pub async fn view(&self, post_id: i64, viewer: Option<&UserRef>) -> Result<PostView, AppError> {
        let post = self
            .db
            .get_post(post_id)
            .await?
            .ok_or(AppError::NotFound("Post not found"))?;
        let viewer_id = viewer.map(|user| user.id);

        let access = AccessService::new(self.db.clone());
        let can_view = access.can_view(&post, viewer_id).await?;

        let tags = self.db.get_post_tags(post.id).await?;
        let comments = if can_view {
            self.db.list_comments(post.id).await?
        } else {
            Vec::new()
        };

        let (is_following, has_requested) = match viewer_id {
            Some(id) if id != post.user_id => (
                self.db.is_following(id, post.user_id).await?,
                self.db.has_access_request(post.id, id).await?,
            ),
            _ => (false, false),
        };

        Ok(PostView {
            post,
            tags,
            comments,
            can_view,
            is_following,
            has_requested,
        })
    }

    /// Append a comment
    ///
    /// # Errors
    /// `Validation` for blank text, `NotFound` if the post does not exist
    pub async fn add_comment(
        &self,
        post_id: i64,
        author: &UserRef,
        text: &str,
    ) -> Result<i64, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment is empty".to_string()));
        }

        if self.db.get_post(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found"));
        }

        let comment_id = self.db.insert_comment(post_id, author.id, text).await?;
        tracing::debug!(post_id, comment_id, author = %author.username, "Comment added");
        Ok(comment_id)
    }
}
