//! One-shot flash messages
//!
//! A handler that redirects stores a message in the `flash` cookie and the
//! next rendered page shows it and clears the cookie.

use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const FLASH_COOKIE: &str = "flash";

/// Store a message for the next page
pub fn push(jar: CookieJar, message: &str) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Take the pending message, if any, and clear it
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).and_then(|cookie| {
        urlencoding::decode(cookie.value())
            .ok()
            .map(|message| message.into_owned())
    });

    match message {
        Some(message) => (
            jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
            Some(message),
        ),
        None => (jar, None),
    }
}

/// Flash a message and redirect with 303 See Other
pub fn redirect(jar: CookieJar, message: &str, to: &str) -> (CookieJar, Redirect) {
    (push(jar, message), Redirect::to(to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_message_is_taken_once() {
        let jar = push(CookieJar::new(), "Post created; 100% done");
        let stored = jar.get(FLASH_COOKIE).unwrap().value().to_string();
        assert!(!stored.contains(' '));

        let (jar, message) = take(jar);
        assert_eq!(message.as_deref(), Some("Post created; 100% done"));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn empty_jar_has_no_message() {
        let (_, message) = take(CookieJar::new());
        assert!(message.is_none());
    }
}
