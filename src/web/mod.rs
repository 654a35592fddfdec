//! HTML pages and form handlers
//!
//! Routes:
//! - `/` listing with `feed`, `tag` and `sort` query parameters
//! - `/post/*` authoring, reading, comments and access requests
//! - `/user/:id`, `/follow/:id`, `/unfollow/:id`
//! - `/tags`, `/tag/:name`
//! - `/my_requests`, `/requests/:id/grant`

mod feed;
pub mod flash;
pub mod layout;
mod metrics;
mod posts;
mod requests;
mod users;

pub use metrics::{metrics_router, track_metrics};

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Create the site router
pub fn web_router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::index))
        .route("/tags", get(feed::tags_page))
        .route("/tag/:name", get(feed::tag_redirect))
        .route(
            "/post/new",
            get(posts::new_post_page).post(posts::create_post),
        )
        .route("/post/:id", get(posts::view_post))
        .route(
            "/post/:id/edit",
            get(posts::edit_post_page).post(posts::update_post),
        )
        .route("/post/:id/delete", post(posts::delete_post))
        .route("/post/:id/comment", post(posts::add_comment))
        .route("/post/:id/request_access", post(requests::request_access))
        .route("/my_requests", get(requests::my_requests))
        .route("/requests/:id/grant", post(requests::grant_request))
        .route("/user/:id", get(users::profile))
        .route("/follow/:id", post(users::follow))
        .route("/unfollow/:id", post(users::unfollow))
}
