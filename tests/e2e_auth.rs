//! E2E tests for registration, login and logout

mod common;

use common::{PASSWORD, TestServer, location};

#[tokio::test]
async fn test_register_then_login() {
    let server = TestServer::new().await;
    let client = server.browser();

    let response = server.register(&client, "alice", PASSWORD).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");

    let (_, body) = server.page(&client, "/login").await;
    assert!(body.contains("Registration successful. Please log in."));

    let response = server.login(&client, "alice", PASSWORD).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");

    let (status, body) = server.page(&client, "/").await;
    assert_eq!(status, 200);
    assert!(body.contains("Signed in as"));
    assert!(body.contains("alice"));
    assert!(body.contains("You are logged in"));

    // The flash message is shown once
    let (_, body) = server.page(&client, "/").await;
    assert!(!body.contains("You are logged in"));
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let server = TestServer::new().await;
    server.signup("alice").await;

    let user = server
        .state
        .db
        .get_user_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(user.password, PASSWORD);
    assert!(user.password.starts_with("$argon2"));
}

#[tokio::test]
async fn test_duplicate_registration_fails() {
    let server = TestServer::new().await;
    let client = server.browser();

    server.register(&client, "alice", PASSWORD).await;
    let response = server.register(&client, "alice", "another password").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/register");

    let (_, body) = server.page(&client, "/register").await;
    assert!(body.contains("User already exists"));
    assert_eq!(server.state.db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_requires_all_fields() {
    let server = TestServer::new().await;
    let client = server.browser();

    let response = server.register(&client, "   ", PASSWORD).await;
    assert_eq!(location(&response), "/register");
    let (_, body) = server.page(&client, "/register").await;
    assert!(body.contains("Please fill in all fields"));

    let response = client
        .post(server.url("/register"))
        .form(&[("username", "bob")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/register");
    assert_eq!(server.state.db.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let server = TestServer::new().await;
    let client = server.browser();
    server.register(&client, "alice", PASSWORD).await;

    let response = server.login(&client, "alice", "wrong").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");

    let (_, body) = server.page(&client, "/login").await;
    assert!(body.contains("Invalid username or password"));

    let response = server.login(&client, "nobody", PASSWORD).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::new().await;
    let (client, _) = server.signup("alice").await;

    let response = client.get(server.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");

    let set_cookie_values: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(ToString::to_string))
        .collect();
    assert!(
        set_cookie_values.iter().any(|v| v.starts_with("session=")),
        "expected session removal header, got: {set_cookie_values:?}"
    );

    let response = client.get(server.url("/post/new")).send().await.unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_required_routes_redirect_to_login() {
    let server = TestServer::new().await;

    for path in ["/post/new", "/my_requests"] {
        let response = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 303, "GET {path}");
        assert_eq!(location(&response), "/login", "GET {path}");
    }

    for path in ["/follow/1", "/post/1/comment", "/requests/1/grant"] {
        let response = server.submit(&server.client, path).await;
        assert_eq!(response.status(), 303, "POST {path}");
        assert_eq!(location(&response), "/login", "POST {path}");
    }
}

#[tokio::test]
async fn test_forged_session_cookie_is_ignored() {
    let server = TestServer::new().await;
    server.signup("alice").await;

    let response = server
        .client
        .get(server.url("/post/new"))
        .header("Cookie", "session=eyJ1c2VyX2lkIjoxfQ.forged")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
}
