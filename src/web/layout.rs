//! Page layout and shared HTML fragments
//!
//! Pages are plain HTML strings. Every piece of user-supplied text goes
//! through `text` or `attr` before it is interpolated.

use axum::response::Html;
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};

use super::flash;
use crate::AppState;
use crate::data::{PostSummary, UserRef};

/// Escape text for element content
pub fn text(value: &str) -> String {
    html_escape::encode_text(value).into_owned()
}

/// Escape text for a double-quoted attribute value
pub fn attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Link to a user's profile
pub fn user_link(id: i64, username: &str) -> String {
    format!("<a href=\"/user/{}\">{}</a>", id, text(username))
}

/// Tag links pointing at the filtered index
pub fn tag_links(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| {
            format!(
                "<a class=\"tag\" href=\"/tag/{}\">#{}</a>",
                attr(&urlencoding::encode(tag)),
                text(tag)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A form with a single submit button
pub fn button_form(action: &str, label: &str) -> String {
    format!(
        "<form class=\"inline\" method=\"post\" action=\"{}\"><button type=\"submit\">{}</button></form>",
        attr(action),
        text(label)
    )
}

/// Link text for a post; untitled posts still get a clickable label
pub fn post_title(title: &str) -> String {
    if title.is_empty() {
        "(untitled)".to_string()
    } else {
        text(title)
    }
}

/// Post listing used by the index and profile pages
///
/// Shows title, author, privacy marker, tags and comment count.
pub fn post_list(posts: &[PostSummary]) -> String {
    if posts.is_empty() {
        return "<p class=\"empty\">No posts yet.</p>".to_string();
    }

    let items: Vec<String> = posts
        .iter()
        .map(|post| {
            let marker = if post.public {
                ""
            } else {
                " <span class=\"private\">[private]</span>"
            };
            format!(
                "<li><a href=\"/post/{}\">{}</a>{} by {} <small>{} · {} comments</small> {}</li>",
                post.id,
                post_title(&post.title),
                marker,
                user_link(post.user_id, &post.username),
                timestamp(&post.created_at),
                post.comments_count,
                tag_links(&post.tags)
            )
        })
        .collect();

    format!("<ul class=\"posts\">\n{}\n</ul>", items.join("\n"))
}

/// List of user links, or a placeholder when empty
pub fn user_list(users: &[UserRef], empty: &str) -> String {
    if users.is_empty() {
        return format!("<p class=\"empty\">{}</p>", text(empty));
    }
    let items: Vec<String> = users
        .iter()
        .map(|user| format!("<li>{}</li>", user_link(user.id, &user.username)))
        .collect();
    format!("<ul>{}</ul>", items.join(""))
}

fn nav(viewer: Option<&UserRef>) -> String {
    match viewer {
        Some(user) => format!(
            r#"<a href="/">Home</a> <a href="/?feed=1">My feed</a> <a href="/tags">Tags</a> <a href="/post/new">New post</a> <a href="/my_requests">Requests</a> <span class="who">Signed in as {}</span> <a href="/logout">Log out</a>"#,
            user_link(user.id, &user.username)
        ),
        None => r#"<a href="/">Home</a> <a href="/tags">Tags</a> <a href="/login">Log in</a> <a href="/register">Register</a>"#
            .to_string(),
    }
}

/// Wrap a page body in the site layout
///
/// Consumes the pending flash message, so the returned jar must be part of
/// the response.
pub fn render(
    state: &AppState,
    jar: CookieJar,
    viewer: Option<&UserRef>,
    title: &str,
    body: &str,
) -> (CookieJar, Html<String>) {
    let (jar, message) = flash::take(jar);
    let flash_html = message
        .map(|message| format!("<p class=\"flash\">{}</p>", text(&message)))
        .unwrap_or_default();
    let site_title = &state.config.site.title;

    let page = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{} - {}</title>
</head>
<body>
  <header><strong><a href="/">{}</a></strong>
  <nav>{}</nav></header>
  {}
  <main>
{}
  </main>
</body>
</html>"#,
        text(title),
        text(site_title),
        text(site_title),
        nav(viewer),
        flash_html,
        body
    );

    (jar, Html(page))
}
