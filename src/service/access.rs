//! Private post access
//!
//! A private post can be read by its author and by any user holding an
//! access request row for it. The row is created by the requester and
//! deleted when the author grants it, so a pending request already grants
//! reading and a granted one no longer does.

use std::sync::Arc;

use crate::data::{AccessRequest, Database, IncomingRequest, Post};
use crate::error::AppError;

/// Decide whether a viewer may read a post's content
///
/// `has_request` is whether an access request row exists for the viewer.
pub fn can_view(post: &Post, viewer_id: Option<i64>, has_request: bool) -> bool {
    if post.public {
        return true;
    }
    match viewer_id {
        Some(id) if id == post.user_id => true,
        Some(_) => has_request,
        None => false,
    }
}

/// Result of asking for access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Created,
    AlreadyRequested,
}

/// Access request service
pub struct AccessService {
    db: Arc<Database>,
}

impl AccessService {
    /// Create new access service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Whether `viewer_id` may read `post`
    pub async fn can_view(&self, post: &Post, viewer_id: Option<i64>) -> Result<bool, AppError> {
        let has_request = match viewer_id {
            Some(id) if !post.public && id != post.user_id => {
                self.db.has_access_request(post.id, id).await?
            }
            _ => false,
        };
        Ok(can_view(post, viewer_id, has_request))
    }

    /// Record a request by `user_id` to read `post_id`
    ///
    /// # Errors
    /// `NotFound` if the post does not exist
    pub async fn request_access(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<RequestOutcome, AppError> {
        if self.db.get_post(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found"));
        }

        if self.db.has_access_request(post_id, user_id).await? {
            return Ok(RequestOutcome::AlreadyRequested);
        }

        if self.db.insert_access_request(post_id, user_id).await? {
            tracing::info!(post_id, user_id, "Access requested");
            Ok(RequestOutcome::Created)
        } else {
            Ok(RequestOutcome::AlreadyRequested)
        }
    }

    /// Requests on posts written by `author_id`, newest first
    pub async fn incoming(&self, author_id: i64) -> Result<Vec<IncomingRequest>, AppError> {
        self.db.list_requests_for_author(author_id).await
    }

    /// Grant a request by deleting it
    ///
    /// # Errors
    /// `Forbidden` if the request does not exist or `author_id` did not
    /// write the requested post
    pub async fn grant(&self, request_id: i64, author_id: i64) -> Result<AccessRequest, AppError> {
        let request = self
            .db
            .get_access_request(request_id)
            .await?
            .filter(|request| request.author_id == author_id)
            .ok_or(AppError::Forbidden)?;

        self.db.delete_access_request(request.id).await?;
        tracing::info!(
            request_id = request.id,
            post_id = request.post_id,
            requester_id = request.user_id,
            "Access request granted"
        );

        Ok(request)
    }
}
