//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services validate input, enforce authorship and visibility rules, and
//! orchestrate database calls.

mod access;
mod account;
mod feed;
mod post;
mod social;
pub mod tags;

pub use access::{AccessService, RequestOutcome, can_view};
pub use account::AccountService;
pub use feed::{FeedQuery, FeedService};
pub use post::{PostService, PostView, build_draft};
pub use social::{Profile, SocialService};
