//! Current-user extractors
//!
//! Every request resolves its user from the signed `session` cookie and a
//! fresh lookup of the user row.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::session::{SESSION_COOKIE, verify_session_token};
use crate::AppState;
use crate::data::UserRef;
use crate::error::AppError;

fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
}

/// Resolve the user behind a request, if any
///
/// A bad or expired token, or a token for a user that no longer exists,
/// resolves to `None`. Only database failures are errors.
async fn resolve_user(parts: &mut Parts, state: &AppState) -> Result<Option<UserRef>, AppError> {
    if let Some(user) = parts.extensions.get::<Option<UserRef>>() {
        return Ok(user.clone());
    }

    let user = match extract_token_from_headers(&parts.headers) {
        Some(token) => match verify_session_token(&token, &state.config.auth.session_secret) {
            Ok(session) => state.db.get_user(session.user_id).await?,
            Err(_) => None,
        },
        None => None,
    };

    parts.extensions.insert(user.clone());
    Ok(user)
}

/// Extractor for the logged-in user
///
/// Anonymous requests are rejected with `AppError::Unauthorized`, which
/// redirects to the login page.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRef);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        resolve_user(parts, &state)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional current user extractor
///
/// Returns None if not authenticated, instead of error.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserRef>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(MaybeUser(resolve_user(parts, &state).await?))
    }
}
