//! Index listing and tag pages

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::layout;
use crate::AppState;
use crate::auth::MaybeUser;
use crate::data::FeedSort;
use crate::error::AppError;
use crate::service::{FeedQuery, FeedService, tags::normalize_tag};

/// Query parameters for the index page
#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    /// "1" for the subscription feed
    feed: Option<String>,
    tag: Option<String>,
    /// "popular" or "recent"
    sort: Option<String>,
}

impl IndexParams {
    fn to_query(&self) -> FeedQuery {
        FeedQuery {
            feed: self.feed.as_deref() == Some("1"),
            tag: self.tag.as_deref().and_then(normalize_tag),
            sort: FeedSort::parse(self.sort.as_deref()),
        }
    }
}

/// Index URL for a listing with a different sort order
fn sort_href(query: &FeedQuery, sort: FeedSort) -> String {
    let mut params = Vec::new();
    if query.feed {
        params.push("feed=1".to_string());
    }
    if let Some(tag) = &query.tag {
        params.push(format!("tag={}", urlencoding::encode(tag)));
    }
    params.push(format!("sort={}", sort.as_str()));
    format!("/?{}", params.join("&"))
}

fn sort_links(query: &FeedQuery) -> String {
    [FeedSort::Recent, FeedSort::Popular]
        .iter()
        .map(|&sort| {
            let label = match sort {
                FeedSort::Recent => "Newest",
                FeedSort::Popular => "Most discussed",
            };
            if sort == query.sort {
                format!("<strong>{}</strong>", label)
            } else {
                format!(
                    "<a href=\"{}\">{}</a>",
                    layout::attr(&sort_href(query, sort)),
                    label
                )
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// GET /
///
/// Lists public posts, or the viewer's subscription feed with `feed=1`.
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    jar: CookieJar,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.to_query();
    let posts = FeedService::new(state.db.clone())
        .list(&query, viewer.as_ref())
        .await?;

    let mut heading = if query.feed && viewer.is_some() {
        "Your feed".to_string()
    } else {
        "Latest posts".to_string()
    };
    if let Some(tag) = &query.tag {
        heading.push_str(&format!(" tagged #{}", layout::text(tag)));
    }

    let body = format!(
        "<h1>{}</h1>\n<p class=\"sort\">Sort: {}</p>\n{}",
        heading,
        sort_links(&query),
        layout::post_list(&posts)
    );
    Ok(layout::render(&state, jar, viewer.as_ref(), "Home", &body))
}

/// GET /tags
pub async fn tags_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let tags = FeedService::new(state.db.clone()).tags().await?;

    let list = if tags.is_empty() {
        "<p class=\"empty\">No tags yet.</p>".to_string()
    } else {
        let items: Vec<String> = tags
            .iter()
            .map(|tag| {
                format!(
                    "<li><a href=\"/tag/{}\">#{}</a> ({})</li>",
                    layout::attr(&urlencoding::encode(&tag.name)),
                    layout::text(&tag.name),
                    tag.count
                )
            })
            .collect();
        format!("<ul class=\"tags\">{}</ul>", items.join("\n"))
    };

    let body = format!("<h1>Tags</h1>\n{}", list);
    Ok(layout::render(&state, jar, viewer.as_ref(), "Tags", &body))
}

/// GET /tag/:name
pub async fn tag_redirect(Path(name): Path<String>) -> Redirect {
    Redirect::to(&format!("/?tag={}", urlencoding::encode(&name)))
}
