//! Social graph service
//!
//! Follow edges and profile pages.

use std::sync::Arc;

use crate::data::{Database, PostSummary, UserRef};
use crate::error::AppError;

/// Everything the profile page shows
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: UserRef,
    /// All of the user's posts, newest first
    pub posts: Vec<PostSummary>,
    pub followers: Vec<UserRef>,
    pub following: Vec<UserRef>,
    /// Viewer follows this user
    pub is_following: bool,
}

/// Social graph service
pub struct SocialService {
    db: Arc<Database>,
}

impl SocialService {
    /// Create new social service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Assemble a user's profile
    ///
    /// # Errors
    /// `NotFound` if the user does not exist
    pub async fn profile(&self, user_id: i64, viewer_id: Option<i64>) -> Result<Profile, AppError> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound("User not found"))?;

        let posts = self.db.list_user_posts(user.id).await?;
        let followers = self.db.list_followers(user.id).await?;
        let following = self.db.list_following(user.id).await?;
        let is_following = match viewer_id {
            Some(id) => self.db.is_following(id, user.id).await?,
            None => false,
        };

        Ok(Profile {
            user,
            posts,
            followers,
            following,
            is_following,
        })
    }

    /// Follow `target_id`
    ///
    /// # Returns
    /// `true` if a new edge was created
    ///
    /// # Errors
    /// `Validation` when following oneself, `NotFound` for an unknown user
    pub async fn follow(&self, follower_id: i64, target_id: i64) -> Result<bool, AppError> {
        if follower_id == target_id {
            return Err(AppError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }

        if self.db.get_user(target_id).await?.is_none() {
            return Err(AppError::NotFound("User not found"));
        }

        if self.db.is_following(follower_id, target_id).await? {
            return Ok(false);
        }

        let created = self.db.insert_subscription(follower_id, target_id).await?;
        if created {
            tracing::info!(follower_id, followed_id = target_id, "Followed");
        }
        Ok(created)
    }

    /// Stop following `target_id`
    ///
    /// # Returns
    /// `true` if an edge was removed
    pub async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<bool, AppError> {
        let removed = self.db.delete_subscription(follower_id, target_id).await?;
        if removed {
            tracing::info!(follower_id, followed_id = target_id, "Unfollowed");
        }
        Ok(removed)
    }
}
