//! Profiles and follow actions

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;

use super::{flash, layout};
use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser};
use crate::error::AppError;
use crate::service::SocialService;

/// GET /user/:id
pub async fn profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let profile = SocialService::new(state.db.clone())
        .profile(user_id, viewer.as_ref().map(|user| user.id))
        .await?;
    let user = &profile.user;

    let follow_form = match &viewer {
        Some(viewer) if viewer.id != user.id => {
            if profile.is_following {
                layout::button_form(&format!("/unfollow/{}", user.id), "Unfollow")
            } else {
                layout::button_form(&format!("/follow/{}", user.id), "Follow")
            }
        }
        _ => String::new(),
    };

    let body = format!(
        r#"<h1>{}</h1>
{}
<h2>Posts</h2>
{}
<h2>Followers ({})</h2>
{}
<h2>Following ({})</h2>
{}"#,
        layout::text(&user.username),
        follow_form,
        layout::post_list(&profile.posts),
        profile.followers.len(),
        layout::user_list(&profile.followers, "No followers yet."),
        profile.following.len(),
        layout::user_list(&profile.following, "Not following anyone."),
    );

    Ok(layout::render(
        &state,
        jar,
        viewer.as_ref(),
        &user.username,
        &body,
    ))
}

/// POST /follow/:id
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(target_id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    let back = format!("/user/{}", target_id);

    match SocialService::new(state.db.clone())
        .follow(user.id, target_id)
        .await
    {
        Ok(true) => Ok(flash::redirect(jar, "You are now following this user", &back)),
        Ok(false) => Ok((jar, Redirect::to(&back))),
        Err(AppError::Validation(message)) => Ok(flash::redirect(jar, &message, &back)),
        Err(e) => Err(e),
    }
}

/// POST /unfollow/:id
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(target_id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    SocialService::new(state.db.clone())
        .unfollow(user.id, target_id)
        .await?;
    Ok(flash::redirect(
        jar,
        "You unfollowed this user",
        &format!("/user/{}", target_id),
    ))
}
