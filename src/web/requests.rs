//! Access request pages

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;

use super::{flash, layout};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{AccessService, RequestOutcome};

/// POST /post/:id/request_access
pub async fn request_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(post_id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    let outcome = AccessService::new(state.db.clone())
        .request_access(post_id, user.id)
        .await?;

    let message = match outcome {
        RequestOutcome::Created => "Request sent to the author",
        RequestOutcome::AlreadyRequested => "You have already requested access",
    };
    Ok(flash::redirect(jar, message, &format!("/post/{}", post_id)))
}

/// GET /my_requests
///
/// Requests on the viewer's own posts.
pub async fn my_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let requests = AccessService::new(state.db.clone())
        .incoming(user.id)
        .await?;

    let list = if requests.is_empty() {
        "<p class=\"empty\">No pending requests.</p>".to_string()
    } else {
        let rows: Vec<String> = requests
            .iter()
            .map(|request| {
                format!(
                    "<tr><td>{}</td><td><a href=\"/post/{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
                    layout::user_link(request.user_id, &request.requester_name),
                    request.post_id,
                    layout::post_title(&request.title),
                    layout::timestamp(&request.created_at),
                    layout::button_form(&format!("/requests/{}/grant", request.id), "Grant")
                )
            })
            .collect();
        format!(
            "<table class=\"requests\">\n<tr><th>From</th><th>Post</th><th>Requested</th><th></th></tr>\n{}\n</table>",
            rows.join("\n")
        )
    };

    let body = format!("<h1>Access requests</h1>\n{}", list);
    Ok(layout::render(&state, jar, Some(&user), "Access requests", &body))
}

/// POST /requests/:id/grant
pub async fn grant_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(request_id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    AccessService::new(state.db.clone())
        .grant(request_id, user.id)
        .await?;
    Ok(flash::redirect(
        jar,
        "Access granted (request removed)",
        "/my_requests",
    ))
}
