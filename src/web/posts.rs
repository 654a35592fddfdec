//! Post pages
//!
//! Authoring, reading and commenting.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::{flash, layout};
use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser};
use crate::data::{Comment, Post};
use crate::error::AppError;
use crate::service::{PostService, PostView, build_draft, tags::join_tags};

/// New/edit post form fields
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    /// Checkbox; "1" when ticked
    public: Option<String>,
    #[serde(default)]
    tags: String,
}

impl PostForm {
    fn is_public(&self) -> bool {
        self.public.as_deref() == Some("1")
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default, alias = "content")]
    text: String,
}

fn post_form(action: &str, submit: &str, post: Option<&Post>, tags: &str) -> String {
    let (title, content, public) = match post {
        Some(post) => (post.title.as_str(), post.content.as_str(), post.public),
        None => ("", "", true),
    };
    let checked = if public { " checked" } else { "" };

    format!(
        r#"<form method="post" action="{}">
  <p><label>Title <input name="title" value="{}" /></label></p>
  <p><label>Content<br /><textarea name="content" rows="12" cols="72">{}</textarea></label></p>
  <p><label>Tags (comma separated) <input name="tags" value="{}" /></label></p>
  <p><label><input type="checkbox" name="public" value="1"{} /> Public</label></p>
  <p><button type="submit">{}</button></p>
</form>"#,
        layout::attr(action),
        layout::attr(title),
        layout::text(content),
        layout::attr(tags),
        checked,
        layout::text(submit)
    )
}

// =============================================================================
// New post
// =============================================================================

/// GET /post/new
pub async fn new_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> impl IntoResponse {
    let body = format!(
        "<h1>New post</h1>\n{}",
        post_form("/post/new", "Publish", None, "")
    );
    layout::render(&state, jar, Some(&user), "New post", &body)
}

/// POST /post/new
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let draft = build_draft(&form.title, &form.content, form.is_public(), &form.tags);
    let post_id = PostService::new(state.db.clone())
        .create(&user, &draft)
        .await?;

    Ok(flash::redirect(jar, "Post created", &format!("/post/{}", post_id)).into_response())
}

// =============================================================================
// View post
// =============================================================================

fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "<p class=\"empty\">No comments yet.</p>".to_string();
    }
    let items: Vec<String> = comments
        .iter()
        .map(|comment| {
            format!(
                "<li>{} <small>{}</small><div class=\"comment\">{}</div></li>",
                layout::user_link(comment.user_id, &comment.username),
                layout::timestamp(&comment.created_at),
                layout::text(&comment.content)
            )
        })
        .collect();
    format!("<ul class=\"comments\">{}</ul>", items.join("\n"))
}

fn render_post(view: &PostView, viewer_id: Option<i64>) -> String {
    let post = &view.post;
    let is_author = viewer_id == Some(post.user_id);
    let mut body = Vec::new();

    body.push(format!("<h1>{}</h1>", layout::post_title(&post.title)));
    body.push(format!(
        "<p class=\"meta\">by {} · {}{}</p>",
        layout::user_link(post.user_id, &post.username),
        layout::timestamp(&post.created_at),
        if post.public { "" } else { " · [private]" }
    ));
    if !view.tags.is_empty() {
        body.push(format!("<p class=\"tags\">{}</p>", layout::tag_links(&view.tags)));
    }

    if is_author {
        body.push(format!(
            "<p><a href=\"/post/{}/edit\">Edit</a> {}</p>",
            post.id,
            layout::button_form(&format!("/post/{}/delete", post.id), "Delete")
        ));
    } else if viewer_id.is_some() {
        let (action, label) = if view.is_following {
            ("unfollow", "Unfollow author")
        } else {
            ("follow", "Follow author")
        };
        body.push(layout::button_form(
            &format!("/{}/{}", action, post.user_id),
            label,
        ));
    }

    if view.can_view {
        body.push(format!(
            "<div class=\"content\" style=\"white-space: pre-wrap\">{}</div>",
            layout::text(&post.content)
        ));
        body.push("<h2>Comments</h2>".to_string());
        body.push(render_comments(&view.comments));
        if viewer_id.is_some() {
            body.push(format!(
                r#"<form method="post" action="/post/{}/comment">
  <p><textarea name="text" rows="4" cols="60"></textarea></p>
  <p><button type="submit">Comment</button></p>
</form>"#,
                post.id
            ));
        }
    } else {
        body.push("<p class=\"private\">This post is private.</p>".to_string());
        if viewer_id.is_some() {
            body.push(layout::button_form(
                &format!("/post/{}/request_access", post.id),
                "Request access",
            ));
        } else {
            body.push("<p><a href=\"/login\">Log in</a> to request access.</p>".to_string());
        }
    }

    body.join("\n")
}

/// GET /post/:id
pub async fn view_post(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    jar: CookieJar,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = PostService::new(state.db.clone())
        .view(post_id, viewer.as_ref())
        .await?;

    let body = render_post(&view, viewer.as_ref().map(|user| user.id));
    Ok(layout::render(
        &state,
        jar,
        viewer.as_ref(),
        &view.post.title,
        &body,
    ))
}

// =============================================================================
// Edit / delete
// =============================================================================

/// GET /post/:id/edit
pub async fn edit_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let (post, tags) = PostService::new(state.db.clone())
        .editable(post_id, user.id)
        .await?;

    let body = format!(
        "<h1>Edit post</h1>\n{}",
        post_form(
            &format!("/post/{}/edit", post.id),
            "Save",
            Some(&post),
            &join_tags(&tags)
        )
    );
    Ok(layout::render(&state, jar, Some(&user), "Edit post", &body))
}

/// POST /post/:id/edit
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(post_id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let draft = build_draft(&form.title, &form.content, form.is_public(), &form.tags);
    PostService::new(state.db.clone())
        .update(post_id, user.id, &draft)
        .await?;
    Ok(flash::redirect(jar, "Post updated", &format!("/post/{}", post_id)).into_response())
}

/// POST /post/:id/delete
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(post_id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    PostService::new(state.db.clone())
        .delete(post_id, user.id)
        .await?;
    Ok(flash::redirect(jar, "Post deleted", "/"))
}

// =============================================================================
// Comments
// =============================================================================

/// POST /post/:id/comment
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let back = format!("/post/{}", post_id);

    match PostService::new(state.db.clone())
        .add_comment(post_id, &user, &form.text)
        .await
    {
        Ok(_) => Ok(flash::redirect(jar, "Comment added", &back)),
        Err(AppError::Validation(message)) => Ok(flash::redirect(jar, &message, &back)),
        Err(e) => Err(e),
    }
}
