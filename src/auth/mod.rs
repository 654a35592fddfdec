//! Username/password authentication
//!
//! Handles:
//! - Registration and login forms
//! - Password hashing
//! - Signed session cookies
//! - Current-user extractors

mod middleware;
mod password;
mod routes;
pub mod session;

pub use middleware::{CurrentUser, MaybeUser};
pub use password::{hash_password, verify_password};
pub use routes::auth_router;
pub use session::{Session, create_session_token, verify_session_token};
