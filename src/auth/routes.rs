//! Registration, login and logout
//!
//! Username/password accounts. A successful login stores a signed session
//! token in the `session` cookie.

use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::middleware::MaybeUser;
use super::session::{Session, clear_session_cookie, create_session_token, session_cookie};
use crate::AppState;
use crate::error::AppError;
use crate::service::AccountService;
use crate::web::{flash, layout};

/// Create authentication router
///
/// Routes:
/// - GET/POST /register - Registration form
/// - GET/POST /login - Login form
/// - GET /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

/// Username and password form fields
#[derive(Debug, Deserialize)]
struct CredentialsForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{}">
  <p><label>Username <input name="username" autocomplete="username" /></label></p>
  <p><label>Password <input name="password" type="password" /></label></p>
  <p><button type="submit">{}</button></p>
</form>"#,
        layout::attr(action),
        layout::text(submit)
    )
}

// =============================================================================
// Register
// =============================================================================

/// GET /register
async fn register_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    jar: CookieJar,
) -> impl IntoResponse {
    let body = format!(
        "<h1>Register</h1>\n{}\n<p>Already have an account? <a href=\"/login\">Log in</a></p>",
        credentials_form("/register", "Register")
    );
    layout::render(&state, jar, viewer.as_ref(), "Register", &body)
}

/// POST /register
///
/// Empty fields and taken usernames are reported with a flash message and a
/// redirect back to the form.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let accounts = AccountService::new(state.db.clone());

    match accounts.register(&form.username, &form.password).await {
        Ok(_) => Ok(flash::redirect(jar, "Registration successful. Please log in.", "/login")
            .into_response()),
        Err(AppError::Validation(message)) => {
            Ok(flash::redirect(jar, &message, "/register").into_response())
        }
        Err(e) => Err(e),
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// GET /login
async fn login_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    jar: CookieJar,
) -> impl IntoResponse {
    let body = format!(
        "<h1>Log in</h1>\n{}\n<p>No account yet? <a href=\"/register\">Register</a></p>",
        credentials_form("/login", "Log in")
    );
    layout::render(&state, jar, viewer.as_ref(), "Log in", &body)
}

/// POST /login
///
/// # Steps
/// 1. Verify username and password
/// 2. Sign a session for the user id
/// 3. Set the session cookie and redirect home
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let accounts = AccountService::new(state.db.clone());

    let Some(user) = accounts
        .authenticate(form.username.trim(), &form.password)
        .await?
    else {
        tracing::info!(username = %form.username.trim(), "Login failed");
        return Ok(flash::redirect(jar, "Invalid username or password", "/login").into_response());
    };

    let session = Session::new(user.id, state.config.auth.session_max_age);
    let token = create_session_token(&session, &state.config.auth.session_secret)?;
    let cookie = session_cookie(
        token,
        state.config.auth.session_max_age,
        state.config.should_use_secure_cookies(),
    );

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(flash::redirect(jar.add(cookie), "You are logged in", "/").into_response())
}

/// GET /logout
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    flash::redirect(jar.remove(clear_session_cookie()), "You are logged out", "/")
}
