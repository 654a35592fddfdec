//! Account service
//!
//! Registration and credential checks.

use std::sync::Arc;

use crate::auth::{hash_password, verify_password};
use crate::data::{Database, UserRef};
use crate::error::AppError;
use crate::metrics::USERS_TOTAL;

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a new user
    ///
    /// The username is trimmed; the password is taken as given.
    ///
    /// # Errors
    /// `Validation` if either field is empty or the username is taken
    pub async fn register(&self, username: &str, password: &str) -> Result<i64, AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Please fill in all fields".to_string()));
        }

        if self.db.username_exists(username).await? {
            return Err(AppError::Validation("User already exists".to_string()));
        }

        let password_hash = hash_password(password.to_string()).await?;
        let user_id = match self.db.insert_user(username, &password_hash).await {
            Ok(id) => id,
            // Lost a race with a concurrent registration of the same name.
            Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                return Err(AppError::Validation("User already exists".to_string()));
            }
            Err(e) => return Err(e),
        };

        USERS_TOTAL.inc();
        tracing::info!(user_id, username = %username, "User registered");

        Ok(user_id)
    }

    /// Check credentials
    ///
    /// # Returns
    /// The user when the password matches, `None` for an unknown user or a
    /// wrong password
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRef>, AppError> {
        let Some(user) = self.db.get_user_by_username(username.trim()).await? else {
            return Ok(None);
        };

        if !verify_password(user.password, password.to_string()).await? {
            tracing::debug!(username = %user.username, "Password mismatch");
            return Ok(None);
        }

        Ok(Some(UserRef {
            id: user.id,
            username: user.username,
        }))
    }
}
