//! SQLite database operations
//!
//! All database access goes through this module.
//! Every statement is parameterized; multi-statement writes run in a
//! transaction.

use chrono::Utc;
use prometheus::HistogramTimer;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use std::path::Path;

use super::models::*;
use crate::error::AppError;
use crate::metrics::{DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS};

const MAX_CONNECTIONS: u32 = 5;

/// Count a query and time it until the returned guard drops.
fn track(operation: &str, table: &str) -> HistogramTimer {
    DB_QUERIES_TOTAL
        .with_label_values(&[operation, table])
        .inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .start_timer()
}

/// Look up or create each tag and link it to the post.
///
/// `tags` must already be normalized; duplicates are ignored by the
/// `post_tags` primary key.
async fn link_tags(
    conn: &mut SqliteConnection,
    post_id: i64,
    tags: &[String],
) -> Result<(), AppError> {
    for name in tags {
        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await?;

        let tag_id = sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file (and its parent directory) if it doesn't
    /// exist, enables foreign keys on every connection and runs pending
    /// migrations.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
        })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Get a user's public identity by id
    pub async fn get_user(&self, id: i64) -> Result<Option<UserRef>, AppError> {
        let _timer = track("SELECT", "users");
        let user = sqlx::query_as::<_, UserRef>("SELECT id, username FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user with the stored password hash by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let _timer = track("SELECT", "users");
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check whether a username is taken
    pub async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let _timer = track("SELECT", "users");
        let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(exists.is_some())
    }

    /// Insert a new user and return its id
    pub async fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64, AppError> {
        let _timer = track("INSERT", "users");
        let result =
            sqlx::query("INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)")
                .bind(username)
                .bind(password_hash)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Count registered users
    pub async fn count_users(&self) -> Result<i64, AppError> {
        let _timer = track("SELECT", "users");
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Insert a post with its tags and return the post id
    pub async fn insert_post(&self, author_id: i64, draft: &PostDraft) -> Result<i64, AppError> {
        let _timer = track("INSERT", "posts");
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO posts (user_id, title, content, public, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(author_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.public)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        let post_id = result.last_insert_rowid();

        link_tags(&mut *tx, post_id, &draft.tags).await?;

        tx.commit().await?;
        Ok(post_id)
    }

    /// Replace a post's title, content, visibility and full tag set
    pub async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<(), AppError> {
        let _timer = track("UPDATE", "posts");
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE posts SET title = ?, content = ?, public = ? WHERE id = ?")
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(draft.public)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        link_tags(&mut *tx, post_id, &draft.tags).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a post. Tag links, comments and requests go with it.
    pub async fn delete_post(&self, post_id: i64) -> Result<(), AppError> {
        let _timer = track("DELETE", "posts");
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get a post with its author's username
    pub async fn get_post(&self, post_id: i64) -> Result<Option<Post>, AppError> {
        let _timer = track("SELECT", "posts");
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, u.username, p.title, p.content, p.public, p.created_at
            FROM posts p JOIN users u ON u.id = p.user_id
            WHERE p.id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    /// Tag names linked to a post, alphabetically
    pub async fn get_post_tags(&self, post_id: i64) -> Result<Vec<String>, AppError> {
        let _timer = track("SELECT", "post_tags");
        let tags = sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.name FROM post_tags pt JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    /// List posts for the index page
    ///
    /// With `subscriber_id` set the author filter is "subscriber or someone
    /// they follow" and visibility is not checked, so private posts of
    /// followed authors are listed.
    pub async fn list_posts(&self, filter: &FeedFilter) -> Result<Vec<PostSummary>, AppError> {
        let timer = track("SELECT", "posts");

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT p.id, p.user_id, u.username, p.title, p.public, p.created_at,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
            FROM posts p JOIN users u ON u.id = p.user_id
            WHERE "#,
        );

        match filter.subscriber_id {
            Some(user_id) => {
                query
                    .push("(p.user_id = ")
                    .push_bind(user_id)
                    .push(" OR p.user_id IN (SELECT followed_id FROM subscriptions WHERE follower_id = ")
                    .push_bind(user_id)
                    .push("))");
            }
            None => {
                query.push("p.public = 1");
            }
        }

        if let Some(tag) = &filter.tag {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
                     WHERE pt.post_id = p.id AND t.name = ",
                )
                .push_bind(tag.clone())
                .push(")");
        }

        query.push(match filter.sort {
            FeedSort::Popular => " ORDER BY comments_count DESC, p.created_at DESC, p.id DESC",
            FeedSort::Recent => " ORDER BY p.created_at DESC, p.id DESC",
        });

        let posts = query
            .build_query_as::<PostSummary>()
            .fetch_all(&self.pool)
            .await?;
        drop(timer);

        self.attach_tags(posts).await
    }

    /// All posts by one author, newest first, any visibility
    pub async fn list_user_posts(&self, user_id: i64) -> Result<Vec<PostSummary>, AppError> {
        let timer = track("SELECT", "posts");
        let posts = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT p.id, p.user_id, u.username, p.title, p.public, p.created_at,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
            FROM posts p JOIN users u ON u.id = p.user_id
            WHERE p.user_id = ?
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        drop(timer);

        self.attach_tags(posts).await
    }

    async fn attach_tags(&self, mut posts: Vec<PostSummary>) -> Result<Vec<PostSummary>, AppError> {
        for post in &mut posts {
            post.tags = self.get_post_tags(post.id).await?;
        }
        Ok(posts)
    }

    /// Count all posts
    pub async fn count_posts(&self) -> Result<i64, AppError> {
        let _timer = track("SELECT", "posts");
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Tags that have at least one post, most used first
    pub async fn list_tags(&self) -> Result<Vec<TagCount>, AppError> {
        let _timer = track("SELECT", "tags");
        let tags = sqlx::query_as::<_, TagCount>(
            r#"
            SELECT t.name, COUNT(*) AS count
            FROM tags t JOIN post_tags pt ON t.id = pt.tag_id
            GROUP BY t.id, t.name
            ORDER BY count DESC, t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Append a comment and return its id
    pub async fn insert_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<i64, AppError> {
        let _timer = track("INSERT", "comments");
        let result = sqlx::query(
            "INSERT INTO comments (post_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Comments on a post, oldest first
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let _timer = track("SELECT", "comments");
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at
            FROM comments c JOIN users u ON u.id = c.user_id
            WHERE c.post_id = ?
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Check whether `follower_id` follows `followed_id`
    pub async fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let _timer = track("SELECT", "subscriptions");
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM subscriptions WHERE follower_id = ? AND followed_id = ?",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exists.is_some())
    }

    /// Insert a follow edge. Returns false if it already existed.
    pub async fn insert_subscription(
        &self,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<bool, AppError> {
        let _timer = track("INSERT", "subscriptions");
        let result = sqlx::query(
            "INSERT OR IGNORE INTO subscriptions (follower_id, followed_id) VALUES (?, ?)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a follow edge. Returns false if there was none.
    pub async fn delete_subscription(
        &self,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<bool, AppError> {
        let _timer = track("DELETE", "subscriptions");
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE follower_id = ? AND followed_id = ?")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Users following `user_id`
    pub async fn list_followers(&self, user_id: i64) -> Result<Vec<UserRef>, AppError> {
        let _timer = track("SELECT", "subscriptions");
        let users = sqlx::query_as::<_, UserRef>(
            r#"
            SELECT u.id, u.username FROM subscriptions s JOIN users u ON u.id = s.follower_id
            WHERE s.followed_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Users `user_id` follows
    pub async fn list_following(&self, user_id: i64) -> Result<Vec<UserRef>, AppError> {
        let _timer = track("SELECT", "subscriptions");
        let users = sqlx::query_as::<_, UserRef>(
            r#"
            SELECT u.id, u.username FROM subscriptions s JOIN users u ON u.id = s.followed_id
            WHERE s.follower_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // =========================================================================
    // Access requests
    // =========================================================================

    /// Check whether `user_id` has an access request row for the post
    pub async fn has_access_request(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let _timer = track("SELECT", "requests");
        let exists =
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM requests WHERE post_id = ? AND user_id = ?")
                .bind(post_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(exists.is_some())
    }

    /// Insert an access request. Returns false if one already existed.
    pub async fn insert_access_request(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let _timer = track("INSERT", "requests");
        let result = sqlx::query(
            "INSERT OR IGNORE INTO requests (post_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get a request together with the requested post's author
    pub async fn get_access_request(&self, request_id: i64) -> Result<Option<AccessRequest>, AppError> {
        let _timer = track("SELECT", "requests");
        let request = sqlx::query_as::<_, AccessRequest>(
            r#"
            SELECT r.id, r.post_id, r.user_id, p.user_id AS author_id, r.created_at
            FROM requests r JOIN posts p ON p.id = r.post_id
            WHERE r.id = ?
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// Requests on posts written by `author_id`, newest first
    pub async fn list_requests_for_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<IncomingRequest>, AppError> {
        let _timer = track("SELECT", "requests");
        let requests = sqlx::query_as::<_, IncomingRequest>(
            r#"
            SELECT r.id, r.post_id, r.user_id, u.username AS requester_name, p.title, r.created_at
            FROM requests r
            JOIN users u ON u.id = r.user_id
            JOIN posts p ON p.id = r.post_id
            WHERE p.user_id = ?
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Delete a request row
    pub async fn delete_access_request(&self, request_id: i64) -> Result<(), AppError> {
        let _timer = track("DELETE", "requests");
        sqlx::query("DELETE FROM requests WHERE id = ?")
            .bind(request_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Count rows in a table (test and diagnostics helper)
    ///
    /// `table` must be one of the schema's table names.
    pub async fn count_rows(&self, table: &str) -> Result<i64, AppError> {
        const TABLES: [&str; 7] = [
            "users",
            "posts",
            "tags",
            "post_tags",
            "comments",
            "subscriptions",
            "requests",
        ];
        if !TABLES.contains(&table) {
            return Err(AppError::Validation(format!("unknown table: {table}")));
        }

        let _timer = track("SELECT", table);
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
