//! Database tests

use super::*;
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn draft(title: &str, public: bool, tags: &[&str]) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        content: format!("{} body", title),
        public,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (db, _temp_dir) = create_test_db().await;
    assert_eq!(db.count_users().await.unwrap(), 0);
    assert_eq!(db.count_posts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_connect_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("dir").join("blog.db");
    Database::connect(&db_path).await.unwrap();
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_user_insert_and_lookup() {
    let (db, _temp_dir) = create_test_db().await;

    let id = db.insert_user("alice", "$argon2id$fake").await.unwrap();

    let user = db.get_user(id).await.unwrap().unwrap();
    assert_eq!(user.username, "alice");

    let full = db.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(full.id, id);
    assert_eq!(full.password, "$argon2id$fake");

    assert!(db.username_exists("alice").await.unwrap());
    assert!(!db.username_exists("bob").await.unwrap());
    assert!(db.get_user(id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user("alice", "hash").await.unwrap();
    let result = db.insert_user("alice", "other").await;
    assert!(matches!(result, Err(crate::error::AppError::Database(_))));
    assert_eq!(db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_post_roundtrip_with_tags() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();

    let post_id = db
        .insert_post(author, &draft("Hello", false, &["rust", "axum"]))
        .await
        .unwrap();

    let post = db.get_post(post_id).await.unwrap().unwrap();
    assert_eq!(post.title, "Hello");
    assert_eq!(post.content, "Hello body");
    assert_eq!(post.username, "alice");
    assert!(!post.public);

    let tags = db.get_post_tags(post_id).await.unwrap();
    assert_eq!(tags, vec!["axum", "rust"]);
}

#[tokio::test]
async fn test_duplicate_tags_link_once() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();

    let tags = crate::service::tags::normalize_tags("A, a, B");
    let post_id = db
        .insert_post(
            author,
            &PostDraft {
                title: "Tagged".to_string(),
                content: String::new(),
                public: true,
                tags,
            },
        )
        .await
        .unwrap();

    assert_eq!(db.count_rows("post_tags").await.unwrap(), 2);
    assert_eq!(db.get_post_tags(post_id).await.unwrap(), vec!["a", "b"]);

    // Tags are shared between posts
    db.insert_post(author, &draft("Again", true, &["a"]))
        .await
        .unwrap();
    assert_eq!(db.count_rows("tags").await.unwrap(), 2);
    assert_eq!(db.count_rows("post_tags").await.unwrap(), 3);
}

#[tokio::test]
async fn test_update_replaces_tags() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();
    let post_id = db
        .insert_post(author, &draft("Before", true, &["old", "keep"]))
        .await
        .unwrap();

    db.update_post(post_id, &draft("After", false, &["keep", "new"]))
        .await
        .unwrap();

    let post = db.get_post(post_id).await.unwrap().unwrap();
    assert_eq!(post.title, "After");
    assert!(!post.public);
    assert_eq!(db.get_post_tags(post_id).await.unwrap(), vec!["keep", "new"]);

    // The orphaned tag row stays behind
    assert_eq!(db.count_rows("tags").await.unwrap(), 3);
    let listed: Vec<String> = db
        .list_tags()
        .await
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(listed, vec!["keep", "new"]);
}

#[tokio::test]
async fn test_delete_post_cascades() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();
    let reader = db.insert_user("bob", "hash").await.unwrap();

    let post_id = db
        .insert_post(author, &draft("Doomed", false, &["x", "y"]))
        .await
        .unwrap();
    db.insert_comment(post_id, reader, "first").await.unwrap();
    db.insert_comment(post_id, author, "second").await.unwrap();
    db.insert_access_request(post_id, reader).await.unwrap();

    db.delete_post(post_id).await.unwrap();

    assert!(db.get_post(post_id).await.unwrap().is_none());
    assert_eq!(db.count_rows("comments").await.unwrap(), 0);
    assert_eq!(db.count_rows("post_tags").await.unwrap(), 0);
    assert_eq!(db.count_rows("requests").await.unwrap(), 0);
}

#[tokio::test]
async fn test_foreign_keys_are_enforced() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();

    assert!(db.insert_comment(999, author, "orphan").await.is_err());
}

#[tokio::test]
async fn test_public_listing_excludes_private_posts() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();
    db.insert_post(author, &draft("open", true, &[])).await.unwrap();
    db.insert_post(author, &draft("closed", false, &[])).await.unwrap();

    let posts = db.list_posts(&FeedFilter::default()).await.unwrap();
    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["open"]);
}

#[tokio::test]
async fn test_subscriber_feed_lists_own_and_followed_posts() {
    let (db, _temp_dir) = create_test_db().await;
    let alice = db.insert_user("alice", "hash").await.unwrap();
    let bob = db.insert_user("bob", "hash").await.unwrap();
    let carol = db.insert_user("carol", "hash").await.unwrap();

    db.insert_post(alice, &draft("alice private", false, &[]))
        .await
        .unwrap();
    db.insert_post(bob, &draft("bob private", false, &[]))
        .await
        .unwrap();
    db.insert_post(carol, &draft("carol public", true, &[]))
        .await
        .unwrap();
    db.insert_subscription(alice, bob).await.unwrap();

    let posts = db
        .list_posts(&FeedFilter {
            subscriber_id: Some(alice),
            ..FeedFilter::default()
        })
        .await
        .unwrap();
    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["bob private", "alice private"]);
}

#[tokio::test]
async fn test_tag_filter_and_popular_sort() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();

    let quiet = db
        .insert_post(author, &draft("quiet", true, &["rust"]))
        .await
        .unwrap();
    let busy = db
        .insert_post(author, &draft("busy", true, &["rust"]))
        .await
        .unwrap();
    let other = db
        .insert_post(author, &draft("other", true, &["go"]))
        .await
        .unwrap();
    db.insert_comment(quiet, author, "one").await.unwrap();
    db.insert_comment(quiet, author, "two").await.unwrap();
    db.insert_comment(busy, author, "three").await.unwrap();
    db.insert_comment(other, author, "four").await.unwrap();

    let recent = db
        .list_posts(&FeedFilter {
            tag: Some("rust".to_string()),
            ..FeedFilter::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = recent.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![busy, quiet]);

    let popular = db
        .list_posts(&FeedFilter {
            tag: Some("rust".to_string()),
            sort: FeedSort::Popular,
            ..FeedFilter::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = popular.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![quiet, busy]);
    assert_eq!(popular[0].comments_count, 2);
    assert_eq!(popular[0].tags, vec!["rust"]);
}

#[tokio::test]
async fn test_user_posts_include_private() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();
    db.insert_post(author, &draft("open", true, &[])).await.unwrap();
    db.insert_post(author, &draft("closed", false, &[])).await.unwrap();

    let posts = db.list_user_posts(author).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "closed");
}

#[tokio::test]
async fn test_comments_oldest_first() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();
    let post_id = db.insert_post(author, &draft("p", true, &[])).await.unwrap();

    db.insert_comment(post_id, author, "first").await.unwrap();
    db.insert_comment(post_id, author, "second").await.unwrap();

    let comments = db.list_comments(post_id).await.unwrap();
    let texts: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(comments[0].username, "alice");
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let (db, _temp_dir) = create_test_db().await;
    let alice = db.insert_user("alice", "hash").await.unwrap();
    let bob = db.insert_user("bob", "hash").await.unwrap();

    assert!(db.insert_subscription(alice, bob).await.unwrap());
    assert!(!db.insert_subscription(alice, bob).await.unwrap());
    assert!(db.is_following(alice, bob).await.unwrap());
    assert!(!db.is_following(bob, alice).await.unwrap());

    let followers = db.list_followers(bob).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].username, "alice");
    let following = db.list_following(alice).await.unwrap();
    assert_eq!(following[0].username, "bob");

    assert!(db.delete_subscription(alice, bob).await.unwrap());
    assert_eq!(db.count_rows("subscriptions").await.unwrap(), 0);
    assert!(db.list_followers(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_access_request_lifecycle() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("alice", "hash").await.unwrap();
    let reader = db.insert_user("bob", "hash").await.unwrap();
    let post_id = db
        .insert_post(author, &draft("Secret", false, &[]))
        .await
        .unwrap();

    assert!(db.insert_access_request(post_id, reader).await.unwrap());
    assert!(!db.insert_access_request(post_id, reader).await.unwrap());
    assert!(db.has_access_request(post_id, reader).await.unwrap());

    let incoming = db.list_requests_for_author(author).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].requester_name, "bob");
    assert_eq!(incoming[0].title, "Secret");
    assert!(db.list_requests_for_author(reader).await.unwrap().is_empty());

    let request = db.get_access_request(incoming[0].id).await.unwrap().unwrap();
    assert_eq!(request.author_id, author);
    assert_eq!(request.user_id, reader);

    db.delete_access_request(request.id).await.unwrap();
    assert!(db.list_requests_for_author(author).await.unwrap().is_empty());
    assert!(!db.has_access_request(post_id, reader).await.unwrap());
}

#[tokio::test]
async fn test_count_rows_rejects_unknown_table() {
    let (db, _temp_dir) = create_test_db().await;
    assert!(db.count_rows("sqlite_master").await.is_err());
}
